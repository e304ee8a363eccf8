//! 搜索控制器集成测试
//! 覆盖并发请求、过期结果丢弃以及搜索类型切换

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use crate::core::models::{SearchResult, SearchType};
    use crate::core::search::{SearchBackend, SearchController, SearchError, SearchState};
    use crate::core::youtube_api::Endpoint;

    /// Backend answering after a per-term delay
    #[derive(Default)]
    struct ScriptedBackend {
        delays_ms: HashMap<String, u64>,
        calls: Arc<AtomicUsize>,
        seen: Arc<parking_lot::Mutex<Vec<(Endpoint, String)>>>,
    }

    impl ScriptedBackend {
        fn with_delays(delays: &[(&str, u64)]) -> Self {
            Self {
                delays_ms: delays.iter().map(|(t, d)| (t.to_string(), *d)).collect(),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl SearchBackend for ScriptedBackend {
        async fn fetch(
            &self,
            endpoint: Endpoint,
            param: &str,
        ) -> Result<SearchResult, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().push((endpoint, param.to_string()));

            let delay = self.delays_ms.get(param).copied().unwrap_or(5);
            tokio::time::sleep(Duration::from_millis(delay)).await;

            match param {
                "quota" => Err(SearchError::Upstream {
                    status: 403,
                    body: json!({"error": "quotaExceeded"}),
                }),
                "offline" => Err(SearchError::Transport {
                    message: "connection refused".into(),
                }),
                _ => Ok(SearchResult::new(json!({"items": [{"id": param}]}))),
            }
        }
    }

    #[tokio::test]
    async fn test_late_response_for_old_term_is_ignored() {
        let controller = SearchController::new(
            ScriptedBackend::with_delays(&[("lo", 150), ("lofi", 10)]),
            SearchType::Video,
        );

        controller.update_term("lo").await;
        controller.update_term("lofi").await;
        controller.wait_idle().await;

        let session = controller.snapshot().await;
        assert_eq!(session.state(), SearchState::Success);
        assert_eq!(session.data().unwrap().items()[0]["id"], "lofi");
    }

    #[tokio::test]
    async fn test_every_change_issues_one_request() {
        let backend = ScriptedBackend::default();
        let calls = Arc::clone(&backend.calls);
        let controller = SearchController::new(backend, SearchType::Video);

        for term in ["a", "ab", "", "abc"] {
            controller.update_term(term).await;
        }
        controller.wait_idle().await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let session = controller.snapshot().await;
        assert_eq!(session.data().unwrap().items()[0]["id"], "abc");
    }

    #[tokio::test]
    async fn test_repeating_a_term_issues_no_request() {
        let backend = ScriptedBackend::default();
        let calls = Arc::clone(&backend.calls);
        let controller = SearchController::new(backend, SearchType::Video);

        controller.update_term("lofi").await;
        controller.update_term("lofi").await;
        controller.wait_idle().await;
        controller.update_term("lofi").await;
        controller.wait_idle().await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(controller.snapshot().await.state(), SearchState::Success);
    }

    #[tokio::test]
    async fn test_loading_while_in_flight() {
        let controller = SearchController::new(
            ScriptedBackend::with_delays(&[("slow", 100)]),
            SearchType::Video,
        );

        controller.update_term("slow").await;
        assert_eq!(controller.snapshot().await.state(), SearchState::Loading);

        controller.wait_idle().await;
        let session = controller.snapshot().await;
        assert!(!session.is_loading());
        assert_eq!(session.state(), SearchState::Success);
    }

    #[tokio::test]
    async fn test_upstream_error_is_surfaced() {
        let controller = SearchController::new(ScriptedBackend::default(), SearchType::Video);

        controller.update_term("quota").await;
        controller.wait_idle().await;

        let session = controller.snapshot().await;
        assert_eq!(session.state(), SearchState::Error);
        assert_eq!(
            session.error(),
            Some(&SearchError::Upstream {
                status: 403,
                body: json!({"error": "quotaExceeded"})
            })
        );

        // a later success clears the error
        controller.update_term("fine").await;
        controller.wait_idle().await;
        let session = controller.snapshot().await;
        assert_eq!(session.state(), SearchState::Success);
        assert!(session.error().is_none());
    }

    #[tokio::test]
    async fn test_transport_error_is_surfaced() {
        let controller = SearchController::new(ScriptedBackend::default(), SearchType::Video);

        controller.update_term("offline").await;
        controller.wait_idle().await;

        let session = controller.snapshot().await;
        assert!(matches!(
            session.error(),
            Some(SearchError::Transport { message }) if message == "connection refused"
        ));
    }

    #[tokio::test]
    async fn test_type_switch_discards_in_flight_result() {
        let controller = SearchController::new(
            ScriptedBackend::with_delays(&[("slow", 80)]),
            SearchType::Video,
        );

        controller.update_term("slow").await;
        controller.switch_type(SearchType::Playlist).await;
        controller.wait_idle().await;

        let session = controller.snapshot().await;
        assert_eq!(session.search_type(), SearchType::Playlist);
        assert_eq!(session.state(), SearchState::Idle);
        assert_eq!(session.term(), "");
        assert!(session.data().is_none());
    }

    #[tokio::test]
    async fn test_playlist_search_uses_playlist_endpoint() {
        let backend = ScriptedBackend::default();
        let seen = Arc::clone(&backend.seen);
        let controller = SearchController::new(backend, SearchType::Playlist);

        controller
            .update_term("https://youtube.com/playlist?list=PLfoo")
            .await;
        controller.update_term("PLbar").await;
        controller.wait_idle().await;

        let seen = seen.lock().clone();
        assert!(seen.contains(&(Endpoint::Playlist, "PLfoo".to_string())));
        assert!(seen.contains(&(Endpoint::Playlist, "PLbar".to_string())));
        assert!(controller.snapshot().await.can_create_playlist());
    }
}
