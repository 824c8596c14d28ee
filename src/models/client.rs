use std::fmt;

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Client {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} <{}>",
            self.id, self.first_name, self.last_name, self.email
        )
    }
}

/// Fields for a client that has not been stored yet
#[derive(Debug, Clone, Default)]
pub struct NewClient {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phones: Vec<String>,
}

impl NewClient {
    pub fn new(first_name: &str, last_name: &str, email: &str) -> Self {
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            phones: Vec::new(),
        }
    }

    pub fn with_phones<I, S>(mut self, phones: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.phones = phones.into_iter().map(Into::into).collect();
        self
    }
}

/// Partial update of a stored client.
///
/// `None` and empty values both mean "leave unchanged". An empty `phones`
/// list does not clear the client's phones.
#[derive(Debug, Clone, Default)]
pub struct ClientUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phones: Option<Vec<String>>,
}

impl ClientUpdate {
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

    pub fn phones<I, S>(mut self, phones: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.phones = Some(phones.into_iter().map(Into::into).collect());
        self
    }

    pub fn supplied_first_name(&self) -> Option<&str> {
        supplied(&self.first_name)
    }

    pub fn supplied_last_name(&self) -> Option<&str> {
        supplied(&self.last_name)
    }

    pub fn supplied_email(&self) -> Option<&str> {
        supplied(&self.email)
    }

    /// The replacement phone set, if one was given and is non-empty
    pub fn supplied_phones(&self) -> Option<&[String]> {
        self.phones.as_deref().filter(|phones| !phones.is_empty())
    }

    /// True when at least one of the name/email columns changes
    pub fn touches_client_row(&self) -> bool {
        self.supplied_first_name().is_some()
            || self.supplied_last_name().is_some()
            || self.supplied_email().is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.touches_client_row() && self.supplied_phones().is_none()
    }
}

fn supplied(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_update() {
        assert!(ClientUpdate::new().is_empty());
        assert!(ClientUpdate::new().first_name("").email("").is_empty());
    }

    #[test]
    fn empty_phone_list_is_not_supplied() {
        let update = ClientUpdate::new().phones(Vec::<String>::new());
        assert!(update.supplied_phones().is_none());
        assert!(update.is_empty());
    }

    #[test]
    fn supplied_fields() {
        let update = ClientUpdate::new()
            .last_name("Smith")
            .email("john.smith@example.com");

        assert_eq!(update.supplied_first_name(), None);
        assert_eq!(update.supplied_last_name(), Some("Smith"));
        assert_eq!(update.supplied_email(), Some("john.smith@example.com"));
        assert!(update.touches_client_row());
        assert!(!update.is_empty());
    }

    #[test]
    fn phones_only_update() {
        let update = ClientUpdate::new().phones(["555-0000"]);
        assert!(!update.touches_client_row());
        assert_eq!(update.supplied_phones(), Some(&["555-0000".to_string()][..]));
    }

    #[test]
    fn display() {
        let client = Client {
            id: 1,
            first_name: "John".into(),
            last_name: "Smith".into(),
            email: "john.smith@example.com".into(),
        };
        assert_eq!(client.to_string(), "1 John Smith <john.smith@example.com>");
    }
}
