//! Integration tests for the users API endpoint

mod test_utils;

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::test_utils::{TestApp, send, test_app};

    /// Tests the identity directory is listed with camelCase traits
    #[tokio::test]
    async fn it_lists_users() {
        let app = test_app().await;

        let (status, body) = send(&app, "GET", "/users", None).await;
        assert_eq!(status, StatusCode::OK);

        let users = body.as_array().unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0]["email"], "developer@localhost");
        assert_eq!(users[0]["firstName"], "Local");
        assert_eq!(users[1]["username"], "testuser");
    }

    /// Tests the directory is not public
    #[tokio::test]
    async fn it_requires_a_session() {
        let ctx = TestApp::new().await;
        let (status, _) = send(&ctx.anonymous(), "GET", "/users", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
