// ==========================================
// 运行控制层测试
// ==========================================
// 测试目标: 目录扇出、模式选择、结果汇总、中断传播
// ==========================================


use sensor_log_import::importer::FormatVersion;
use sensor_log_import::store::StoreConnector;
use sensor_log_import::{CancelFlag, ImportError, RunController, RunOptions};
use std::fs;
use std::sync::Arc;
use test_helpers::{current_format_content, device_dir, test_config, write_log, MockConnector};

const GOOD_ROW: &str = "2020-01-01 00:00:00.000000,123456789012345,21,3.7";
const MALFORMED_ROW: &str = "not-a-timestamp,123456789012345,21,3.7";
const OLD_ROW: &str = "2020-01-01 00:00:00.000000,123456789012345,19,3.7";

fn controller(config: sensor_log_import::ImporterConfig, connector: &Arc<MockConnector>) -> RunController {
    RunController::new(config, Arc::clone(connector) as Arc<dyn StoreConnector>)
}

#[tokio::test]
async fn test_full_sweep_across_directories() {
    let temp = tempfile::tempdir().unwrap();
    let dir_a = device_dir(temp.path(), "111111111111111");
    let dir_b = device_dir(temp.path(), "222222222222222");
    // 名称不满足完整匹配的目录不参与运行
    let ignored = device_dir(temp.path(), "misc-folder");
    write_log(&dir_a, "a1.csv", &current_format_content(&[GOOD_ROW]));
    write_log(&dir_a, "a2.csv", &current_format_content(&[MALFORMED_ROW]));
    write_log(&dir_b, "b1.csv", &current_format_content(&[GOOD_ROW]));
    write_log(&ignored, "x.csv", &current_format_content(&[GOOD_ROW]));

    let connector = Arc::new(MockConnector::new());
    let controller = controller(test_config(temp.path()), &connector);

    let summary = controller
        .run(&RunOptions::default(), &CancelFlag::new())
        .await
        .unwrap();

    assert_eq!(summary.uploaded, 2);
    assert_eq!(summary.quarantined_parse, 1);
    assert_eq!(summary.total(), 3);
    assert!(summary.has_quarantine());

    assert!(dir_a.abs_path.join("archive").join("a1.csv").exists());
    assert!(dir_a.abs_path.join("problem").join("a2.csv").exists());
    assert!(dir_b.abs_path.join("archive").join("b1.csv").exists());
    assert!(ignored.abs_path.join("x.csv").exists());

    // 每个目录任务独享一个连接
    assert_eq!(connector.connect_count(), 2);
    assert_eq!(connector.batches().len(), 2);
}

#[tokio::test]
async fn test_archive_only_mode_moves_without_connecting() {
    let temp = tempfile::tempdir().unwrap();
    let dir = device_dir(temp.path(), "111111111111111");
    write_log(&dir, "a.csv", &current_format_content(&[GOOD_ROW]));
    write_log(&dir, "b.csv", "totally broken content");

    let connector = Arc::new(MockConnector::new());
    let controller = controller(test_config(temp.path()), &connector);

    let opts = RunOptions {
        archive_only: true,
        ..RunOptions::default()
    };
    let summary = controller.run(&opts, &CancelFlag::new()).await.unwrap();

    assert_eq!(summary.force_archived, 2);
    assert!(!summary.has_quarantine());
    assert!(dir.abs_path.join("archive").join("a.csv").exists());
    assert!(dir.abs_path.join("archive").join("b.csv").exists());
    // 仅归档模式完全不接触时序库
    assert_eq!(connector.connect_count(), 0);
}

#[tokio::test]
async fn test_single_file_mode_bypasses_enumeration() {
    let temp = tempfile::tempdir().unwrap();
    let dir = device_dir(temp.path(), "111111111111111");
    let target = write_log(&dir, "a.csv", &current_format_content(&[GOOD_ROW]));
    // 同目录的其他文件不被处理
    write_log(&dir, "b.csv", &current_format_content(&[GOOD_ROW]));

    let connector = Arc::new(MockConnector::new());
    let controller = controller(test_config(temp.path()), &connector);

    let opts = RunOptions {
        single_file: Some(target.path()),
        ..RunOptions::default()
    };
    let summary = controller.run(&opts, &CancelFlag::new()).await.unwrap();

    assert_eq!(summary.uploaded, 1);
    assert_eq!(summary.total(), 1);
    assert!(dir.abs_path.join("archive").join("a.csv").exists());
    assert!(dir.abs_path.join("b.csv").exists());
}

#[tokio::test]
async fn test_strict_mode_counts_no_data_as_quarantine() {
    let temp = tempfile::tempdir().unwrap();
    let dir = device_dir(temp.path(), "111111111111111");
    write_log(&dir, "a.csv", &current_format_content(&[OLD_ROW]));

    let connector = Arc::new(MockConnector::new());
    let controller = controller(test_config(temp.path()), &connector);

    let opts = RunOptions {
        strict: true,
        ..RunOptions::default()
    };
    let summary = controller.run(&opts, &CancelFlag::new()).await.unwrap();

    assert_eq!(summary.no_data_quarantined, 1);
    assert!(summary.has_quarantine());
    assert!(dir.abs_path.join("problem").join("a.csv").exists());
}

#[tokio::test]
async fn test_upload_failures_are_reported_not_retried() {
    let temp = tempfile::tempdir().unwrap();
    let dir = device_dir(temp.path(), "111111111111111");
    write_log(&dir, "a.csv", &current_format_content(&[GOOD_ROW]));

    let connector = Arc::new(MockConnector::failing());
    let controller = controller(test_config(temp.path()), &connector);

    let summary = controller
        .run(&RunOptions::default(), &CancelFlag::new())
        .await
        .unwrap();

    // 提交失败立即结算, 运行内不重试
    assert_eq!(summary.quarantined_upload, 1);
    assert_eq!(connector.connect_count(), 1);
    assert!(dir.abs_path.join("problem").join("a.csv").exists());
}

#[tokio::test]
async fn test_cancelled_run_surfaces_cancellation() {
    let temp = tempfile::tempdir().unwrap();
    let dir = device_dir(temp.path(), "111111111111111");
    write_log(&dir, "a.csv", &current_format_content(&[GOOD_ROW]));

    let connector = Arc::new(MockConnector::new());
    let controller = controller(test_config(temp.path()), &connector);

    let cancel = CancelFlag::new();
    cancel.cancel();

    let err = controller
        .run(&RunOptions::default(), &cancel)
        .await
        .unwrap_err();

    // 汇总器不得吞掉中断
    assert!(matches!(err, ImportError::Cancelled));
    assert!(dir.abs_path.join("a.csv").exists());
}

#[tokio::test]
async fn test_legacy_sweep_uses_directory_identifier() {
    let temp = tempfile::tempdir().unwrap();
    let dir = device_dir(temp.path(), "356938035643809");
    let row = test_helpers::legacy_row(&[
        (0, "2016-05-10 08:30:00.000000"),
        (2, "19"),
        (25, "3.7"),
    ]);
    write_log(&dir, "a.csv", &format!("{}\n", row));

    let connector = Arc::new(MockConnector::new());
    let controller = controller(test_config(temp.path()), &connector);

    let opts = RunOptions {
        format: FormatVersion::Legacy,
        ..RunOptions::default()
    };
    let summary = controller.run(&opts, &CancelFlag::new()).await.unwrap();

    assert_eq!(summary.uploaded, 1);
    let batches = connector.batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].points[0].identifier, "356938035643809");
}

#[tokio::test]
async fn test_reserved_subfolders_not_rediscovered() {
    let temp = tempfile::tempdir().unwrap();
    let dir = device_dir(temp.path(), "111111111111111");
    fs::create_dir_all(dir.abs_path.join("archive")).unwrap();
    fs::write(
        dir.abs_path.join("archive").join("done.csv"),
        current_format_content(&[GOOD_ROW]),
    )
    .unwrap();

    let connector = Arc::new(MockConnector::new());
    let controller = controller(test_config(temp.path()), &connector);

    let summary = controller
        .run(&RunOptions::default(), &CancelFlag::new())
        .await
        .unwrap();

    // 已归档文件不会被再次发现
    assert_eq!(summary.total(), 0);
    assert!(dir.abs_path.join("archive").join("done.csv").exists());
}
