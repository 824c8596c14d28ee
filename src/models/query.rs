use super::Client;

/// A single exact-match lookup on clients
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientFilter {
    FirstName(String),
    LastName(String),
    Email(String),
    /// Matches clients owning this phone number
    Phone(String),
}

/// Loose lookup with all four filters optional.
///
/// Resolved in priority order first name, last name, email, phone. The
/// first non-empty value wins and the others are ignored.
#[derive(Debug, Clone, Default)]
pub struct ClientQuery {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl ClientQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn first_name(mut self, value: &str) -> Self {
        self.first_name = Some(value.to_string());
        self
    }

    pub fn last_name(mut self, value: &str) -> Self {
        self.last_name = Some(value.to_string());
        self
    }

    pub fn email(mut self, value: &str) -> Self {
        self.email = Some(value.to_string());
        self
    }

    pub fn phone(mut self, value: &str) -> Self {
        self.phone = Some(value.to_string());
        self
    }

    pub fn filter(&self) -> Option<ClientFilter> {
        fn pick(value: &Option<String>) -> Option<String> {
            value.as_ref().filter(|v| !v.is_empty()).cloned()
        }

        pick(&self.first_name)
            .map(ClientFilter::FirstName)
            .or_else(|| pick(&self.last_name).map(ClientFilter::LastName))
            .or_else(|| pick(&self.email).map(ClientFilter::Email))
            .or_else(|| pick(&self.phone).map(ClientFilter::Phone))
    }
}

/// Outcome of [`crate::db::ClientRepository::find_clients`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindResult {
    /// The query carried no filter, so nothing was looked up
    NoFilter,
    Clients(Vec<Client>),
}

impl FindResult {
    /// Matched clients, or `None` when no filter was given
    pub fn clients(&self) -> Option<&[Client]> {
        match self {
            FindResult::NoFilter => None,
            FindResult::Clients(clients) => Some(clients),
        }
    }

    pub fn into_clients(self) -> Option<Vec<Client>> {
        match self {
            FindResult::NoFilter => None,
            FindResult::Clients(clients) => Some(clients),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_filter() {
        assert_eq!(ClientQuery::new().filter(), None);
        assert_eq!(ClientQuery::new().first_name("").phone("").filter(), None);
    }

    #[test]
    fn first_name_wins() {
        let query = ClientQuery::new()
            .phone("555-1234")
            .email("a@b.com")
            .last_name("Doe")
            .first_name("John");
        assert_eq!(query.filter(), Some(ClientFilter::FirstName("John".into())));
    }

    #[test]
    fn empty_values_fall_through() {
        let query = ClientQuery::new()
            .first_name("")
            .last_name("")
            .email("a@b.com")
            .phone("555-1234");
        assert_eq!(query.filter(), Some(ClientFilter::Email("a@b.com".into())));

        let query = ClientQuery::new().email("").phone("555-1234");
        assert_eq!(query.filter(), Some(ClientFilter::Phone("555-1234".into())));
    }

    #[test]
    fn no_filter_differs_from_empty_result() {
        assert_ne!(FindResult::NoFilter, FindResult::Clients(vec![]));
        assert!(FindResult::NoFilter.clients().is_none());
        assert_eq!(FindResult::Clients(vec![]).clients(), Some(&[][..]));
    }
}
