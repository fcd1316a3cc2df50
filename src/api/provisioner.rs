/// One page of a provisioner listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionerPage<P> {
    pub provisioners: Vec<P>,

    /// Cursor for the next page, empty on the last page.
    pub next_cursor: String,
}

impl<P> ProvisionerPage<P> {
    pub fn is_last(&self) -> bool {
        self.next_cursor.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cursor_ends_listing() {
        let page = ProvisionerPage {
            provisioners: vec!["admin", "acme"],
            next_cursor: "acme".to_owned(),
        };
        assert!(!page.is_last());

        let page = ProvisionerPage::<&str> {
            provisioners: vec![],
            next_cursor: String::new(),
        };
        assert!(page.is_last());
    }
}
