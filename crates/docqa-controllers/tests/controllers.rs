mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use tokio::time::Instant;

use common::CountingBackend;
use docqa_controllers::{
    AnswerController, FollowUpController, Interaction, Phase, SearchController, UploadController,
};
use docqa_core::config::ClientSettings;
use docqa_core::types::{UploadFile, VlmModel};
use docqa_core::{ApiError, ValidationError};

fn settings() -> ClientSettings {
    ClientSettings::default()
}

#[tokio::test]
async fn blank_search_never_reaches_the_transport() {
    let backend = CountingBackend::new();
    let mut search = SearchController::new(settings().search);
    for query in ["", "   ", "\t\n"] {
        assert_eq!(search.search(&backend, query, VlmModel::Gpt4o).await, Phase::Failed);
        assert_eq!(
            search.error().map(ToString::to_string),
            Some(ValidationError::EmptyQuery.to_string())
        );
    }
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn motor_bracket_search_selects_citation_one() {
    let backend = CountingBackend::matching_everything();
    let mut search = SearchController::new(settings().search);
    assert_eq!(search.phase(), Phase::Idle);

    let request = search.begin("查询电机支架 CAD 的孔径与中心距", VlmModel::Gpt4o, None).unwrap();
    assert_eq!(search.phase(), Phase::Pending);
    assert_eq!(request.model, VlmModel::Gpt4o);
    assert_eq!(request.strategy.to_string(), "vector");

    let outcome = docqa_core::Backend::search(&backend, &request).await;
    assert_eq!(search.complete(outcome), Phase::Succeeded);
    let first = search.results().first().expect("hits for the motor bracket query");
    assert_eq!(first.file_name, "MotorBracket_v1.2.dwg");
    assert_eq!(first.citation_number, 1);
    let citations: Vec<u32> = search.results().iter().map(|r| r.citation_number).collect();
    assert_eq!(citations, vec![1, 2, 3]);
    assert_eq!(backend.searches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn clear_twice_is_the_same_idle_state() {
    let backend = CountingBackend::new();
    let mut search = SearchController::new(settings().search);
    let mut upload = UploadController::new(&settings().upload);
    let mut answer = AnswerController::new(&settings().qa);
    let mut follow_up = FollowUpController::new();

    search.search(&backend, "Kafka", VlmModel::QwenVl).await;
    answer.ask(&backend, "消息队列").await;
    follow_up.set_document(Some("2".into()));
    follow_up.ask(&backend, "吞吐量？", VlmModel::QwenVl).await;

    let controllers: [&mut dyn Interaction; 4] = [&mut search, &mut upload, &mut answer, &mut follow_up];
    for c in controllers {
        c.reset();
        let once = (c.phase(), c.error().cloned());
        c.reset();
        assert_eq!((c.phase(), c.error().cloned()), once);
        assert_eq!(once, (Phase::Idle, None));
    }
    assert!(search.results().is_empty());
    assert!(answer.answer().is_none());
    assert!(follow_up.history().is_empty());
}

#[tokio::test]
async fn sixty_megabyte_upload_is_rejected_locally() {
    let backend = CountingBackend::new();
    let mut upload = UploadController::new(&settings().upload);
    let file = UploadFile::new("/drawings/plant.pdf", 60 * 1024 * 1024);

    let mut reported = Vec::new();
    let phase = upload.upload(&backend, Some(&file), None, |p| reported.push(p)).await;

    assert_eq!(phase, Phase::Failed);
    assert!(upload.error().is_some_and(|e| e.is_validation()));
    assert!(reported.is_empty());
    assert_eq!(backend.uploads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_file_is_rejected_locally() {
    let backend = CountingBackend::new();
    let mut upload = UploadController::new(&settings().upload);
    upload.upload(&backend, None, None, |_| {}).await;
    assert_eq!(
        upload.error().map(ToString::to_string),
        Some(ValidationError::MissingFile.to_string())
    );
    assert_eq!(backend.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn progress_climbs_below_100_then_completes_and_resets() {
    let backend = CountingBackend::slow(Duration::from_millis(3_000));
    let mut upload = UploadController::new(&settings().upload);
    let file = UploadFile::new("/drawings/bracket.dwg", 1024);

    let mut reported = Vec::new();
    let phase = upload.upload(&backend, Some(&file), None, |p| reported.push(p)).await;
    assert_eq!(phase, Phase::Succeeded);

    let (last, climbing) = reported.split_last().unwrap();
    assert_eq!(*last, 100);
    assert!(climbing.windows(2).all(|w| w[0] <= w[1]), "{reported:?}");
    assert!(climbing.iter().all(|p| *p <= 90), "{reported:?}");
    assert_eq!(climbing.last(), Some(&90));

    assert_eq!(upload.progress(Instant::now()), 100);
    tokio::time::advance(Duration::from_millis(1_000)).await;
    assert_eq!(upload.progress(Instant::now()), 0);
}

#[tokio::test(start_paused = true)]
async fn failed_upload_drops_progress_to_zero() {
    let mut backend = CountingBackend::slow(Duration::from_millis(500));
    backend.fail_with = Some(ApiError::transport("connection reset"));
    let mut upload = UploadController::new(&settings().upload);
    let file = UploadFile::new("/drawings/bracket.dxf", 1024);

    let mut reported = Vec::new();
    assert_eq!(upload.upload(&backend, Some(&file), None, |p| reported.push(p)).await, Phase::Failed);
    assert_eq!(reported.last(), Some(&0));
    assert_eq!(upload.error().map(ToString::to_string).as_deref(), Some("connection reset"));
}

#[tokio::test]
async fn switching_document_clears_history() {
    let backend = CountingBackend::new();
    let mut follow_up = FollowUpController::new();
    follow_up.set_document(Some("1".into()));
    follow_up.ask(&backend, "中心距是多少？", VlmModel::Gpt4o).await;
    follow_up.ask(&backend, "材质？", VlmModel::Gpt4o).await;
    assert_eq!(follow_up.history().len(), 2);

    follow_up.set_document(Some("2".into()));
    assert!(follow_up.history().is_empty());
    assert_eq!(follow_up.phase(), Phase::Idle);
}

#[tokio::test]
async fn late_answer_for_previous_document_is_dropped() {
    let backend = CountingBackend::new();
    let mut follow_up = FollowUpController::new();
    follow_up.set_document(Some("1".into()));

    let ticket = follow_up.begin("公差等级？", VlmModel::InternVl).unwrap();
    follow_up.set_document(Some("3".into()));
    let outcome = docqa_core::Backend::follow_up(&backend, &ticket.request).await;
    follow_up.complete(ticket, outcome);

    assert!(follow_up.history().is_empty());
    assert_eq!(follow_up.document(), Some("3"));
    assert_eq!(follow_up.phase(), Phase::Idle);
}

#[tokio::test]
async fn overlapping_follow_ups_are_paired_with_their_questions() {
    let backend = CountingBackend::new();
    let mut follow_up = FollowUpController::new();
    follow_up.set_document(Some("1".into()));

    let first = follow_up.begin("中心距是多少？", VlmModel::Gpt4o).unwrap();
    let second = follow_up.begin("材质是什么？", VlmModel::Gpt4o).unwrap();
    let (a, b) = tokio::join!(
        docqa_core::Backend::follow_up(&backend, &first.request),
        docqa_core::Backend::follow_up(&backend, &second.request),
    );
    let expected = [
        (second.request.question.clone(), b.as_ref().map(|r| r.answer.clone()).unwrap()),
        (first.request.question.clone(), a.as_ref().map(|r| r.answer.clone()).unwrap()),
    ];
    follow_up.complete(second, b);
    follow_up.complete(first, a);

    let history: Vec<(String, String)> =
        follow_up.history().iter().map(|h| (h.question.clone(), h.answer.clone())).collect();
    assert_eq!(history, expected);
    assert_eq!(backend.follow_ups.load(std::sync::atomic::Ordering::SeqCst), 2);
}

#[tokio::test]
async fn transport_failure_is_scoped_to_its_controller() {
    let backend = CountingBackend::failing(ApiError {
        error: "ServiceUnavailable".into(),
        message: "index is rebuilding".into(),
        status_code: 503,
    });
    let mut search = SearchController::new(settings().search);
    let mut answer = AnswerController::new(&settings().qa);

    assert_eq!(search.search(&backend, "孔径", VlmModel::Gpt4o).await, Phase::Failed);
    assert_eq!(search.error().map(ToString::to_string).as_deref(), Some("index is rebuilding"));
    assert_eq!(answer.phase(), Phase::Idle);
    assert!(answer.error().is_none());
}

#[tokio::test]
async fn direct_answer_lists_sources_in_order() {
    let backend = CountingBackend::new();
    let mut answer = AnswerController::new(&settings().qa);
    assert_eq!(answer.ask(&backend, "6061").await, Phase::Succeeded);
    assert_eq!(answer.question(), Some("6061"));
    let names: Vec<&str> = answer.sources().iter().map(|s| s.file_name.as_str()).collect();
    assert_eq!(names, vec!["MotorBracket_v1.2.dwg"]);
    assert!(answer.confidence().is_some());

    assert_eq!(answer.ask(&backend, "  ").await, Phase::Failed);
    assert_eq!(backend.asks.load(Ordering::SeqCst), 1);
}
