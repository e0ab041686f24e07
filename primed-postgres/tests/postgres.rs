mod init;

#[cfg(test)]
mod tests {
    use super::init::init;
    use primed_core::{PrepareConfig, Session};
    use primed_postgres::PostgresSession;
    use primed_tests::{execute_tests, init_logs, silent_logs};
    use std::sync::Mutex;

    static MUTEX: Mutex<()> = Mutex::new(());

    #[tokio::test]
    async fn postgres() {
        init_logs();
        let _guard = MUTEX.lock().unwrap();

        let (url, container) = init().await;
        let error_msg = format!("Could not connect to `{url}`");
        let session = PostgresSession::connect(url.into())
            .await
            .expect(&error_msg);
        execute_tests(session).await;
        drop(container);
    }

    #[tokio::test]
    async fn wrong_url() {
        silent_logs! {
            assert!(
                PostgresSession::connect("mysql://some_url".into())
                    .await
                    .is_err()
            );
        }
    }

    #[tokio::test]
    async fn prepare_config_from_url() {
        init_logs();
        let _guard = MUTEX.lock().unwrap();

        let (url, container) = init().await;
        let separator = if url.contains('?') { '&' } else { '?' };
        let url = format!("{url}{separator}prepare_on_start=false&list_expansion_limit=4");
        let session = PostgresSession::connect(url.into())
            .await
            .expect("Could not connect with the preparation parameters");
        assert_eq!(
            session.config(),
            PrepareConfig {
                prepare_on_start: false,
                list_expansion_limit: 4,
            }
        );
        assert!(!session.is_closed());
        drop(container);
    }
}
