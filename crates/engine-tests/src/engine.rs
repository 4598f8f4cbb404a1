#[cfg(test)]
mod tests {
    use crate::{
        order_rows, table_config,
        utils::{MemorySource, RecordingLoader, files_in},
    };
    use connectors::bigquery::table::WriteDisposition;
    use engine_runtime::execution::orchestrator::TransferOrchestrator;
    use serde_json::Value;
    use std::sync::Arc;
    use tracing_test::traced_test;

    #[traced_test]
    #[tokio::test]
    async fn staging_files_exist_only_while_loading() {
        let staging = tempfile::tempdir().unwrap();
        let loader = Arc::new(RecordingLoader::default());

        let result = TransferOrchestrator::new(
            &table_config(40, staging.path()),
            MemorySource::new(order_rows(100)),
            loader.clone(),
        )
        .run()
        .await;

        assert!(result.success);
        let records = loader.records();
        assert_eq!(records.len(), 3);
        for record in &records {
            assert!(record.file_existed);
            assert!(!record.path.exists());
            let name = record.path.file_name().unwrap().to_string_lossy().to_string();
            assert!(name.starts_with("chunk_") && name.ends_with(".parquet"));
        }
        assert_eq!(
            records.iter().map(|r| r.rows_in_file).collect::<Vec<_>>(),
            vec![40, 40, 20]
        );
        assert_eq!(files_in(staging.path()), 0);
    }

    #[traced_test]
    #[tokio::test]
    async fn failed_load_stops_run_and_cleans_up() {
        let staging = tempfile::tempdir().unwrap();
        let source = MemorySource::new(order_rows(100));
        let journal = source.journal();
        let loader = Arc::new(RecordingLoader::failing_on_call(1));

        let result =
            TransferOrchestrator::new(&table_config(25, staging.path()), source, loader.clone())
                .run()
                .await;

        assert!(!result.success);
        assert_eq!(result.rows_transferred, 25);
        assert_eq!(result.chunks_written, 1);
        assert!(
            result
                .error
                .as_deref()
                .unwrap()
                .contains("Provided Schema does not match Table")
        );

        // The failed chunk's file was staged, then removed.
        let records = loader.records();
        assert_eq!(records.len(), 2);
        assert!(records[1].file_existed);
        assert_eq!(files_in(staging.path()), 0);

        let journal = journal.lock().unwrap();
        assert_eq!(journal.reads, vec![(0, 25), (25, 25)]);
        assert!(journal.closed);
        assert!(logs_contain("Transfer failed after 25 of 100 rows"));
    }

    #[tokio::test]
    async fn read_failure_reconnects_once_without_retrying_fetch() {
        let staging = tempfile::tempdir().unwrap();
        let source = MemorySource::new(order_rows(100)).failing_read_at(0);
        let journal = source.journal();
        let loader = Arc::new(RecordingLoader::default());

        let result =
            TransferOrchestrator::new(&table_config(25, staging.path()), source, loader.clone())
                .run()
                .await;

        assert!(!result.success);
        assert_eq!(result.rows_transferred, 0);
        assert!(loader.records().is_empty());

        let journal = journal.lock().unwrap();
        assert_eq!(journal.reads, vec![(0, 25)]);
        assert_eq!(journal.reconnects, 1);
        assert!(journal.closed);
    }

    #[tokio::test]
    async fn result_serializes_with_partial_counters() {
        let staging = tempfile::tempdir().unwrap();
        let source = MemorySource::new(order_rows(100)).failing_read_at(50);

        let result = TransferOrchestrator::new(
            &table_config(25, staging.path()),
            source,
            Arc::new(RecordingLoader::default()),
        )
        .run()
        .await;

        let json: Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();
        assert_eq!(json["success"], Value::Bool(false));
        assert_eq!(json["rows_transferred"], 50);
        assert_eq!(json["total_rows"], 100);
        assert_eq!(json["chunks_written"], 2);
        assert!(json["bytes_transferred"].as_u64().unwrap() > 0);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn single_chunk_table_truncates_once() {
        let staging = tempfile::tempdir().unwrap();
        let loader = Arc::new(RecordingLoader::default());

        let result = TransferOrchestrator::new(
            &table_config(1000, staging.path()),
            MemorySource::new(order_rows(10)),
            loader.clone(),
        )
        .run()
        .await;

        assert!(result.success);
        assert_eq!(result.rows_transferred, 10);
        assert_eq!(loader.dispositions(), vec![WriteDisposition::Truncate]);
    }
}
