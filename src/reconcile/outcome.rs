use crate::domain::payment::PaymentStatus;

/// Maps the gateway's payment status onto an internal transition.
/// `pending` and anything unrecognized produce no transition at all,
/// so stale or informational signals never touch the store.
pub fn outcome_for(gateway_status: &str) -> Option<PaymentStatus> {
    match gateway_status {
        "approved" => Some(PaymentStatus::Paid),
        "rejected" => Some(PaymentStatus::Fail),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::outcome_for;
    use crate::domain::payment::PaymentStatus;

    #[test]
    fn approved_maps_to_paid() {
        assert_eq!(outcome_for("approved"), Some(PaymentStatus::Paid));
    }

    #[test]
    fn rejected_maps_to_fail() {
        assert_eq!(outcome_for("rejected"), Some(PaymentStatus::Fail));
    }

    #[test]
    fn pending_and_unknown_map_to_no_transition() {
        assert_eq!(outcome_for("pending"), None);
        assert_eq!(outcome_for("in_process"), None);
        assert_eq!(outcome_for(""), None);
    }
}
