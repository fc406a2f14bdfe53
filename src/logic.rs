use itertools::Itertools;
use varisat::Lit;

/// Clauses asserting that exactly one of `lits` holds.
pub(crate) fn exactly_one(lits: Vec<Lit>) -> Vec<Vec<Lit>> {
    let mut clauses = Vec::with_capacity(lits.len() * (lits.len() + 1) / 2 + 1);

    // no two are true; (!A + !B) * (!A + !C) * ...
    clauses.extend(
        lits.iter()
            .combinations(2)
            .map(|pair| vec![!*pair[0], !*pair[1]]),
    );
    // at least one is true; A + B + C + ...
    clauses.push(lits);

    clauses
}
