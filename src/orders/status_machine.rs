use crate::orders::OrderStatus;

/// Guard for order status transitions
pub struct StatusMachine;

impl StatusMachine {
    /// Check if a status transition is valid
    ///
    /// # Valid Transitions
    /// - Pending → Paid, Shipped, Cancelled
    /// - Paid → Shipped, Cancelled
    /// - Shipped → Delivered, Cancelled
    /// - Delivered → (terminal)
    /// - Cancelled → (terminal)
    /// - Any status → same status (idempotent)
    pub fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
        if from == to {
            return true;
        }

        matches!(
            (from, to),
            (OrderStatus::Pending, OrderStatus::Paid)
                | (OrderStatus::Pending, OrderStatus::Shipped)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
                | (OrderStatus::Paid, OrderStatus::Shipped)
                | (OrderStatus::Paid, OrderStatus::Cancelled)
                | (OrderStatus::Shipped, OrderStatus::Delivered)
                | (OrderStatus::Shipped, OrderStatus::Cancelled)
        )
    }

    /// Attempt a transition, returning the new status or a message
    /// naming the rejected pair
    pub fn transition(from: OrderStatus, to: OrderStatus) -> Result<OrderStatus, String> {
        if Self::is_valid_transition(from, to) {
            Ok(to)
        } else {
            Err(format!("Invalid status transition from {} to {}", from, to))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions_are_valid() {
        let valid = [
            (OrderStatus::Pending, OrderStatus::Paid),
            (OrderStatus::Pending, OrderStatus::Shipped),
            (OrderStatus::Pending, OrderStatus::Cancelled),
            (OrderStatus::Paid, OrderStatus::Shipped),
            (OrderStatus::Paid, OrderStatus::Cancelled),
            (OrderStatus::Shipped, OrderStatus::Delivered),
            (OrderStatus::Shipped, OrderStatus::Cancelled),
        ];

        for (from, to) in valid {
            assert!(
                StatusMachine::is_valid_transition(from, to),
                "transition {} -> {} should be allowed",
                from,
                to
            );
            assert_eq!(StatusMachine::transition(from, to), Ok(to));
        }
    }

    #[test]
    fn test_backward_and_skip_transitions_are_rejected() {
        let invalid = [
            (OrderStatus::Paid, OrderStatus::Pending),
            (OrderStatus::Shipped, OrderStatus::Paid),
            (OrderStatus::Shipped, OrderStatus::Pending),
            (OrderStatus::Pending, OrderStatus::Delivered),
            (OrderStatus::Paid, OrderStatus::Delivered),
        ];

        for (from, to) in invalid {
            assert!(
                !StatusMachine::is_valid_transition(from, to),
                "transition {} -> {} should be rejected",
                from,
                to
            );
            assert!(StatusMachine::transition(from, to).is_err());
        }
    }

    #[test]
    fn test_cancelling_a_delivered_order_is_rejected() {
        assert!(!StatusMachine::is_valid_transition(
            OrderStatus::Delivered,
            OrderStatus::Cancelled
        ));
        let result = StatusMachine::transition(OrderStatus::Delivered, OrderStatus::Cancelled);
        assert!(result.unwrap_err().contains("Invalid status transition"));
    }

    #[test]
    fn test_same_status_is_idempotent() {
        for status in ALL_STATUSES {
            assert!(StatusMachine::is_valid_transition(status, status));
        }
    }

    const ALL_STATUSES: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Paid,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    #[test]
    fn test_terminal_states_allow_no_exit() {
        for terminal in [OrderStatus::Delivered, OrderStatus::Cancelled] {
            for to in ALL_STATUSES {
                if to != terminal {
                    assert!(
                        !StatusMachine::is_valid_transition(terminal, to),
                        "{} must be terminal, allowed -> {}",
                        terminal,
                        to
                    );
                }
            }
        }
    }
}
