use crate::condition::Condition;

/// Condition that holds when the selector `model_key` points at one of `owner_ids`.
///
/// A single owner yields a plain equality; several owners yield an `any` disjunction in
/// the given order.
pub fn ownership_condition(model_key: &str, owner_ids: &[String]) -> Condition {
    match owner_ids {
        [single] => Condition::equals(model_key, single.as_str()),
        owners => Condition::any(
            owners
                .iter()
                .map(|id| Condition::equals(model_key, id.as_str()))
                .collect(),
        ),
    }
}

/// Gates an element's own conditions behind ownership.
///
/// Absent or literal `true` conditions are replaced outright; anything else is wrapped whole
/// in a two-element `all`, never flattened.
pub fn compose_conditions(existing: Option<Condition>, ownership: Condition) -> Condition {
    match existing {
        None | Some(Condition::Literal(true)) => ownership,
        Some(existing) => Condition::all(vec![existing, ownership]),
    }
}
