//! End-to-end pipeline scenarios against the scripted mock backend.
//!
//! These walk the full upload, poll, fetch, bind flow the way the CLI
//! drives it, with the backend's pacing compressed to milliseconds.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use checky::api::{ApiError, MockApi, UploadReceipt};
use checky::chat::ChatSession;
use checky::models::{
    AnalysisReport, Article, ArticleId, JobStatus, RiskCounts, RiskLevel, Sentence,
};
use checky::pipeline::{AnalysisEvent, AnalysisSession, PipelineError, PollPolicy, TimeoutPolicy};

const LABOR_CONTRACT: &str = "제1조 (근로계약 기간)\n\
계약 기간은 2025년 1월 1일부터로 한다. 수습 기간은 3개월로 한다.\n\
\n\
제2조 (근무 장소)\n\
근무 장소는 서울 본사로 한다.\n";

fn receipt() -> UploadReceipt {
    UploadReceipt {
        task_id: "task-7".to_string(),
        file_name: "resume.pdf".to_string(),
        extracted_text: LABOR_CONTRACT.to_string(),
    }
}

fn safe(id: &str, text: &str) -> Sentence {
    Sentence {
        id: id.to_string(),
        text: text.to_string(),
        risk: RiskLevel::Safe,
        why: None,
        fix: None,
    }
}

/// Report matching the segmenter's ids for [`LABOR_CONTRACT`], with one
/// warning verdict on the probation sentence.
fn risky_report() -> AnalysisReport {
    let articles = vec![
        Article {
            id: ArticleId::Num(1),
            title: "제1조 (근로계약 기간)".to_string(),
            sentences: vec![
                safe("s1-1", "계약 기간은 2025년 1월 1일부터로 한다."),
                Sentence {
                    id: "s1-2".to_string(),
                    text: "수습 기간은 3개월로 한다.".to_string(),
                    risk: RiskLevel::Warning,
                    why: Some("수습 중 근로 조건이 명시되어 있지 않습니다.".to_string()),
                    fix: Some("수습 기간 중 급여 비율을 명시하세요.".to_string()),
                },
            ],
        },
        Article {
            id: ArticleId::Num(2),
            title: "제2조 (근무 장소)".to_string(),
            sentences: vec![safe("s2-1", "근무 장소는 서울 본사로 한다.")],
        },
    ];
    let counts = RiskCounts::tally(&articles);
    AnalysisReport {
        safety_percent: counts.safety_percent(),
        counts,
        articles,
        title: Some("표준 근로계약서".to_string()),
        file_name: Some("resume.pdf".to_string()),
    }
}

fn empty_report() -> AnalysisReport {
    AnalysisReport {
        articles: Vec::new(),
        counts: RiskCounts::default(),
        safety_percent: 100.0,
        title: None,
        file_name: None,
    }
}

fn fast_policy(max_attempts: u32, on_timeout: TimeoutPolicy) -> PollPolicy {
    PollPolicy {
        interval: Duration::from_millis(1),
        max_attempts,
        on_timeout,
    }
}

fn spawn_collector() -> (
    mpsc::Sender<AnalysisEvent>,
    tokio::task::JoinHandle<Vec<AnalysisEvent>>,
) {
    let (tx, mut rx) = mpsc::channel(100);
    let handle = tokio::spawn(async move {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    });
    (tx, handle)
}

#[tokio::test]
async fn follows_a_job_from_upload_to_bound_report() {
    let api = Arc::new(
        MockApi::new()
            .with_upload(receipt())
            .with_statuses(vec![
                JobStatus::Processing,
                JobStatus::Processing,
                JobStatus::Completed,
            ])
            .with_report(risky_report()),
    );
    let mut session =
        AnalysisSession::new(api.clone(), fast_policy(30, TimeoutPolicy::ForceComplete));
    let (tx, collector) = spawn_collector();

    // A mid-size file sails through the local size check.
    let outcome = session
        .analyze_bytes("resume.pdf", vec![0u8; 5 * 1024 * 1024], tx)
        .await
        .unwrap();

    assert_eq!(outcome.job.id, "task-7");
    assert_eq!(outcome.job.file_name, "resume.pdf");
    assert_eq!(outcome.job.status, JobStatus::Completed);
    assert_eq!(outcome.job.attempts, 3);
    assert_eq!(api.status_calls(), 3);
    assert_eq!(api.report_calls(), 1);

    // The warning verdict landed on the matching segmented sentence.
    let first = &outcome.contract.articles[0];
    assert_eq!(first.sentences[1].risk, RiskLevel::Warning);
    assert!(first.sentences[1].why.is_some());
    assert_eq!(outcome.contract.articles[1].sentences[0].risk, RiskLevel::Safe);
    assert_eq!(outcome.report.counts.warning, 1);

    let events = collector.await.unwrap();
    assert!(events
        .iter()
        .any(|e| matches!(e, AnalysisEvent::Submitted { job_id, .. } if job_id == "task-7")));
    assert!(events
        .iter()
        .any(|e| matches!(e, AnalysisEvent::Completed { attempts: 3 })));
    assert!(!events
        .iter()
        .any(|e| matches!(e, AnalysisEvent::SegmentationDegraded { .. })));
}

#[tokio::test]
async fn progress_starts_past_zero_and_never_moves_backwards() {
    let api = Arc::new(
        MockApi::new()
            .with_upload(receipt())
            .with_statuses(vec![
                JobStatus::Queued,
                JobStatus::Processing,
                JobStatus::Processing,
                JobStatus::Processing,
                JobStatus::Completed,
            ])
            .with_report(risky_report()),
    );
    let mut session =
        AnalysisSession::new(api.clone(), fast_policy(30, TimeoutPolicy::ForceComplete));
    let (tx, collector) = spawn_collector();

    session
        .analyze_bytes("resume.pdf", b"%PDF-1.4".to_vec(), tx)
        .await
        .unwrap();

    let events = collector.await.unwrap();
    let percents: Vec<u8> = events
        .iter()
        .filter_map(|e| match e {
            AnalysisEvent::Progress { percent, .. } => Some(*percent),
            _ => None,
        })
        .collect();

    assert_eq!(percents.first(), Some(&10));
    assert!(percents.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(percents.last(), Some(&100));
    assert!(percents[..percents.len() - 1].iter().all(|&p| p <= 90));
}

#[tokio::test]
async fn exhausted_poll_budget_force_completes_by_default() {
    let api = Arc::new(
        MockApi::new()
            .with_upload(receipt())
            .with_statuses(vec![JobStatus::Processing])
            .with_report(risky_report()),
    );
    let mut session =
        AnalysisSession::new(api.clone(), fast_policy(30, TimeoutPolicy::ForceComplete));
    let (tx, collector) = spawn_collector();

    let outcome = session
        .analyze_bytes("resume.pdf", b"%PDF-1.4".to_vec(), tx)
        .await
        .unwrap();

    assert_eq!(api.status_calls(), 30);
    assert_eq!(outcome.job.status, JobStatus::Completed);
    assert_eq!(api.report_calls(), 1);

    let events = collector.await.unwrap();
    assert!(!events
        .iter()
        .any(|e| matches!(e, AnalysisEvent::Failed { .. })));
}

#[tokio::test]
async fn exhausted_poll_budget_reports_an_error_when_configured() {
    let api = Arc::new(
        MockApi::new()
            .with_upload(receipt())
            .with_statuses(vec![JobStatus::Processing]),
    );
    let mut session =
        AnalysisSession::new(api.clone(), fast_policy(5, TimeoutPolicy::ReportError));
    let (tx, collector) = spawn_collector();

    let err = session
        .analyze_bytes("resume.pdf", b"%PDF-1.4".to_vec(), tx)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::PollBudgetExhausted { attempts: 5 }
    ));
    assert_eq!(api.status_calls(), 5);
    assert_eq!(api.report_calls(), 0);

    let events = collector.await.unwrap();
    assert!(events
        .iter()
        .any(|e| matches!(e, AnalysisEvent::Failed { .. })));
}

#[tokio::test]
async fn status_poll_failures_halt_the_pipeline() {
    let api = Arc::new(
        MockApi::new()
            .with_upload(receipt())
            .with_status_script(vec![
                Ok(JobStatus::Processing),
                Err(ApiError::Http {
                    status: 500,
                    detail: "Internal Server Error".to_string(),
                }),
            ]),
    );
    let mut session =
        AnalysisSession::new(api.clone(), fast_policy(30, TimeoutPolicy::ForceComplete));
    let (tx, _collector) = spawn_collector();

    let err = session
        .analyze_bytes("resume.pdf", b"%PDF-1.4".to_vec(), tx)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::StatusPoll(_)));
    assert_eq!(api.status_calls(), 2);
    assert_eq!(api.report_calls(), 0);
}

#[tokio::test]
async fn result_fetch_failures_leave_the_unannotated_contract() {
    let api = Arc::new(
        MockApi::new()
            .with_upload(receipt())
            .with_statuses(vec![JobStatus::Completed])
            .with_report_error(ApiError::Http {
                status: 500,
                detail: "result not ready".to_string(),
            }),
    );
    let mut session =
        AnalysisSession::new(api.clone(), fast_policy(30, TimeoutPolicy::ForceComplete));
    let (tx, _collector) = spawn_collector();

    let err = session
        .analyze_bytes("resume.pdf", b"%PDF-1.4".to_vec(), tx)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::ResultFetch(_)));

    // The segmented text survives as a fallback, just without verdicts.
    let contract = session.contract().expect("segmentation kept");
    assert_eq!(contract.articles.len(), 2);
    assert!(contract
        .articles
        .iter()
        .flat_map(|a| &a.sentences)
        .all(|s| s.risk == RiskLevel::Safe && s.why.is_none()));
}

#[tokio::test]
async fn failed_job_surfaces_as_analysis_failed() {
    let api = Arc::new(
        MockApi::new()
            .with_upload(receipt())
            .with_statuses(vec![JobStatus::Processing, JobStatus::Failed]),
    );
    let mut session =
        AnalysisSession::new(api.clone(), fast_policy(30, TimeoutPolicy::ForceComplete));
    let (tx, _collector) = spawn_collector();

    let err = session
        .analyze_bytes("resume.pdf", b"%PDF-1.4".to_vec(), tx)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::AnalysisFailed));
    assert_eq!(api.report_calls(), 0);
}

#[tokio::test]
async fn unknown_statuses_keep_the_poll_alive() {
    let api = Arc::new(
        MockApi::new()
            .with_upload(receipt())
            .with_statuses(vec![
                JobStatus::Other("re-checking".to_string()),
                JobStatus::Processing,
                JobStatus::Completed,
            ])
            .with_report(risky_report()),
    );
    let mut session =
        AnalysisSession::new(api.clone(), fast_policy(30, TimeoutPolicy::ForceComplete));
    let (tx, _collector) = spawn_collector();

    let outcome = session
        .analyze_bytes("resume.pdf", b"%PDF-1.4".to_vec(), tx)
        .await
        .unwrap();

    assert_eq!(outcome.job.attempts, 3);
    assert_eq!(outcome.job.status, JobStatus::Completed);
}

#[tokio::test]
async fn cancellation_stops_polling_for_good() {
    let api = Arc::new(
        MockApi::new()
            .with_upload(receipt())
            .with_statuses(vec![JobStatus::Processing])
            .with_status_delay(Duration::from_millis(80)),
    );
    let mut session =
        AnalysisSession::new(api.clone(), fast_policy(30, TimeoutPolicy::ForceComplete));

    let cancel = session.cancel_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        cancel.cancel();
    });

    let (tx, collector) = spawn_collector();
    let err = session
        .analyze_bytes("resume.pdf", b"%PDF-1.4".to_vec(), tx)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Cancelled));

    // The response that was in flight is discarded and nothing new goes out.
    let polls_at_cancel = api.status_calls();
    assert!(polls_at_cancel <= 1);
    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(api.status_calls(), polls_at_cancel);

    let events = collector.await.unwrap();
    assert!(!events
        .iter()
        .any(|e| matches!(e, AnalysisEvent::Completed { .. })));
    assert!(!events
        .iter()
        .any(|e| matches!(e, AnalysisEvent::Failed { .. })));
}

#[tokio::test]
async fn archives_are_rejected_before_upload() {
    let api = Arc::new(MockApi::new());
    let mut session = AnalysisSession::new(api.clone(), PollPolicy::default());
    let (tx, _collector) = spawn_collector();

    let err = session
        .analyze_bytes("bundle.zip", vec![0u8; 64], tx)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::InvalidFile(_)));
    assert_eq!(api.upload_calls(), 0);
}

#[tokio::test]
async fn oversized_files_are_rejected_before_upload() {
    let api = Arc::new(MockApi::new());
    let mut session = AnalysisSession::new(api.clone(), PollPolicy::default());
    let (tx, _collector) = spawn_collector();

    let err = session
        .analyze_bytes("huge.pdf", vec![0u8; 21 * 1024 * 1024], tx)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::InvalidFile(_)));
    assert_eq!(api.upload_calls(), 0);
}

#[tokio::test]
async fn analyze_file_reads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("resume.pdf");
    tokio::fs::write(&path, b"%PDF-1.4").await.unwrap();

    let api = Arc::new(
        MockApi::new()
            .with_upload(receipt())
            .with_statuses(vec![JobStatus::Completed])
            .with_report(risky_report()),
    );
    let mut session =
        AnalysisSession::new(api.clone(), fast_policy(30, TimeoutPolicy::ForceComplete));
    let (tx, _collector) = spawn_collector();

    let outcome = session.analyze_file(&path, tx).await.unwrap();
    assert_eq!(outcome.job.id, "task-7");
    assert_eq!(api.upload_calls(), 1);
}

#[tokio::test]
async fn missing_files_surface_a_read_error() {
    let api = Arc::new(MockApi::new());
    let mut session = AnalysisSession::new(api.clone(), PollPolicy::default());
    let (tx, _collector) = spawn_collector();

    let err = session
        .analyze_file(Path::new("/nonexistent/resume.pdf"), tx)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::FileRead { .. }));
    assert_eq!(api.upload_calls(), 0);
}

#[tokio::test]
async fn upload_failures_carry_the_api_error() {
    let api = Arc::new(MockApi::new().with_upload_error(ApiError::Http {
        status: 500,
        detail: "Internal Server Error".to_string(),
    }));
    let mut session = AnalysisSession::new(api.clone(), PollPolicy::default());
    let (tx, _collector) = spawn_collector();

    let err = session
        .analyze_bytes("resume.pdf", b"%PDF-1.4".to_vec(), tx)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Upload(ApiError::Http { status: 500, .. })
    ));
    assert_eq!(api.status_calls(), 0);
}

#[tokio::test]
async fn unstructured_text_reports_degraded_segmentation() {
    let api = Arc::new(
        MockApi::new()
            .with_upload(UploadReceipt {
                task_id: "task-8".to_string(),
                file_name: "notes.txt".to_string(),
                extracted_text: "그냥 메모입니다. 조항 구조는 없습니다.".to_string(),
            })
            .with_statuses(vec![JobStatus::Completed])
            .with_report(empty_report()),
    );
    let mut session =
        AnalysisSession::new(api.clone(), fast_policy(30, TimeoutPolicy::ForceComplete));
    let (tx, collector) = spawn_collector();

    let outcome = session
        .analyze_bytes("notes.txt", b"notes".to_vec(), tx)
        .await
        .unwrap();

    assert_eq!(outcome.contract.articles.len(), 1);
    assert_eq!(outcome.contract.sentence_count(), 2);

    let events = collector.await.unwrap();
    assert!(events
        .iter()
        .any(|e| matches!(e, AnalysisEvent::SegmentationDegraded { sentences: 2 })));
}

#[tokio::test]
async fn chat_negotiates_to_the_shape_the_backend_accepts() {
    let api = Arc::new(
        MockApi::new()
            .accept_chat_keys(&["question", "conversation_history"])
            .with_chat_answer("수습 기간 조항은 주의가 필요해요."),
    );
    let mut session = ChatSession::new(api.clone());

    let exchange = session.ask("수습 조항 괜찮아?").await;

    assert_eq!(exchange.text, "수습 기간 조항은 주의가 필요해요.");
    assert_eq!(api.chat_calls(), 2);
    assert_eq!(session.history().len(), 3);

    // A second question starts over from the first candidate shape.
    let exchange = session.ask("그럼 어떻게 고치면 돼?").await;
    assert_eq!(exchange.text, "수습 기간 조항은 주의가 필요해요.");
    assert_eq!(api.chat_calls(), 4);
}
