use super::value_objects::OrderDraft;

// ============================================================================
// Draft Commands - Represent user edits to the order form
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftChange {
    CustomerName(String),
    ItemType(String),
    Replace(OrderDraft),
    Reset,
}

impl DraftChange {
    /// Apply the edit, returning the resulting draft.
    pub fn apply_to(self, draft: &OrderDraft) -> OrderDraft {
        match self {
            DraftChange::CustomerName(name) => OrderDraft {
                customer_name: name,
                ..draft.clone()
            },
            DraftChange::ItemType(item) => OrderDraft {
                item_type: item,
                ..draft.clone()
            },
            DraftChange::Replace(next) => next,
            DraftChange::Reset => OrderDraft::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_changes_keep_other_field() {
        let draft = OrderDraft::new("john", "latte");

        let renamed = DraftChange::CustomerName("jane".into()).apply_to(&draft);
        assert_eq!(renamed, OrderDraft::new("jane", "latte"));

        let reitemed = DraftChange::ItemType("mocha".into()).apply_to(&draft);
        assert_eq!(reitemed, OrderDraft::new("john", "mocha"));
    }

    #[test]
    fn test_reset_empties_draft() {
        let draft = OrderDraft::new("john", "latte");
        assert_eq!(DraftChange::Reset.apply_to(&draft), OrderDraft::default());
    }
}
