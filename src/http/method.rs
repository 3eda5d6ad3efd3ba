/// The subset of HTTP methods this core dispatches on.
///
/// `GET` and `HEAD` are served; every other token, recognized HTTP verb
/// or not, collapses into `Other` and is answered with `405 Method Not
/// Allowed` by the connection handler. There is deliberately no enum
/// variant per RFC method: dispatch only ever branches three ways.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Method {
    Get,
    Head,
    Other,
}

impl Method {
    /// Classifies an already-uppercased method token from the request line.
    pub(crate) fn from_token(token: &str) -> Method {
        match token {
            "GET" => Method::Get,
            "HEAD" => Method::Head,
            _ => Method::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_and_head_are_recognized() {
        assert_eq!(Method::from_token("GET"), Method::Get);
        assert_eq!(Method::from_token("HEAD"), Method::Head);
    }

    #[test]
    fn anything_else_is_other() {
        assert_eq!(Method::from_token("POST"), Method::Other);
        assert_eq!(Method::from_token("PUT"), Method::Other);
        assert_eq!(Method::from_token("DELETE"), Method::Other);
        assert_eq!(Method::from_token("TRACE"), Method::Other);
    }
}
