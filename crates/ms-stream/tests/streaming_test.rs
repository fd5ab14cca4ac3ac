//! End-to-end behaviour of the streaming driver against a scripted engine.

mod common;

use std::time::Duration;

use bytes::Bytes;
use common::{patterned, Delivery, RecordingSource};
use ms_core::{AnalyzeOptions, EngineOutputKind, Error, OutputFormat};
use ms_engine::{
    CallLog, EngineAdapter, EngineCall, EngineSettings, Script, ScriptedEngine, ScriptedFactory,
};
use ms_stream::source::{FnSource, Immediate};
use ms_stream::{AnalysisOutput, Session, StreamController};

fn options(chunk_size: u64, format: OutputFormat) -> AnalyzeOptions {
    AnalyzeOptions::default()
        .with_chunk_size(chunk_size)
        .with_format(format)
}

fn position(calls: &[EngineCall], pred: impl Fn(&EngineCall) -> bool) -> Option<usize> {
    calls.iter().rposition(pred)
}

// ---------------------------------------------------------------------------
// Read law
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sequential_read_count_and_lengths() {
    for chunk in [1u64, 7, 64, 256] {
        for size in [0u64, 1, chunk - 1, chunk, chunk + 1, 3 * chunk, 10 * chunk + 7] {
            let factory = ScriptedFactory::new(Script::new().finish_after(size));
            let mut source = RecordingSource::new(patterned(size as usize));
            let reads = source.reads();

            let mut session = Session::new(&factory, options(chunk, OutputFormat::Json)).unwrap();
            session.analyze(&mut source).await.unwrap();
            session.close();

            let expected_reads = size.div_ceil(chunk) as usize;
            let lengths = reads.lengths();
            assert_eq!(lengths.len(), expected_reads, "size {size} chunk {chunk}");

            if expected_reads > 0 {
                let (last, rest) = lengths.split_last().unwrap();
                assert!(rest.iter().all(|&l| l as u64 == chunk), "size {size} chunk {chunk}");
                let tail = if size % chunk == 0 { chunk } else { size % chunk };
                assert_eq!(*last as u64, tail, "size {size} chunk {chunk}");
            }

            let log = factory.log();
            let calls = log.calls();
            assert_eq!(log.count(|c| matches!(c, EngineCall::Finalize)), 1);
            let finalize_at = position(&calls, |c| matches!(c, EngineCall::Finalize)).unwrap();
            let last_feed = position(&calls, |c| matches!(c, EngineCall::Continue { .. }));
            if let Some(last_feed) = last_feed {
                assert!(last_feed < finalize_at);
            }
        }
    }
}

#[tokio::test]
async fn offsets_advance_by_chunk() {
    let factory = ScriptedFactory::new(Script::new());
    let mut source = RecordingSource::new(patterned(1000));
    let reads = source.reads();

    let mut session = Session::new(&factory, options(256, OutputFormat::Text)).unwrap();
    session.analyze(&mut source).await.unwrap();

    assert_eq!(reads.offsets(), vec![0, 256, 512, 768]);
    assert_eq!(factory.log().inits(), vec![(1000, 0)]);
}

// ---------------------------------------------------------------------------
// Seeking
// ---------------------------------------------------------------------------

#[tokio::test]
async fn seek_to_zero_after_first_chunk_restarts_once() {
    let factory = ScriptedFactory::new(Script::new().seek_after_feed(1, 0));
    let mut source = RecordingSource::new(patterned(1000));
    let reads = source.reads();

    let mut session = Session::new(&factory, options(256, OutputFormat::Object)).unwrap();
    session.analyze(&mut source).await.unwrap();

    assert_eq!(factory.log().inits(), vec![(1000, 0), (1000, 0)]);
    assert_eq!(reads.offsets(), vec![0, 0, 256, 512, 768]);
}

#[tokio::test]
async fn seek_into_trailing_index_then_back() {
    // read the head, jump to the tail, then come back after the head
    let factory = ScriptedFactory::new(
        Script::new()
            .seek_after_feed(1, 900)
            .seek_after_feed(2, 100)
            .finish_after(300),
    );
    let mut source = RecordingSource::new(patterned(1000));
    let reads = source.reads();

    let mut session = Session::new(&factory, options(100, OutputFormat::Object)).unwrap();
    session.analyze(&mut source).await.unwrap();

    assert_eq!(reads.offsets(), vec![0, 900, 100]);
    assert_eq!(factory.log().inits(), vec![(1000, 0), (1000, 900), (1000, 100)]);
}

#[tokio::test]
async fn seek_beyond_four_gibibytes() {
    const SIZE: u64 = 6 << 30;
    let target = (5u64 << 30) + 17;

    let factory = ScriptedFactory::new(Script::new().seek_after_feed(1, target).finish_after(128));
    let mut offsets = Vec::new();
    {
        let mut source = Immediate(FnSource::new(
            || Ok(SIZE),
            |n, offset| {
                offsets.push(offset);
                Ok(Bytes::from(vec![0u8; n]))
            },
        ));
        let mut session = Session::new(&factory, options(64, OutputFormat::Json)).unwrap();
        session.analyze(&mut source).await.unwrap();
    }

    assert_eq!(offsets, vec![0, target]);
    assert_eq!(factory.log().inits(), vec![(SIZE, 0), (SIZE, target)]);
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

fn bare_adapter(script: Script) -> (EngineAdapter<ScriptedEngine>, CallLog) {
    let engine = ScriptedEngine::new(script, EngineOutputKind::Json);
    let log = engine.log();
    let settings = EngineSettings {
        output_kind: EngineOutputKind::Json,
        cover_data: false,
        full: false,
    };
    (EngineAdapter::new(engine, settings), log)
}

#[tokio::test]
async fn synchronous_read_failure_skips_success_branch() {
    let (mut adapter, log) = bare_adapter(Script::new());
    let mut source = Immediate(FnSource::new(
        || Ok(4096),
        |_n, _offset| Err("disk on fire".into()),
    ));

    let mut outcomes = Vec::new();
    StreamController::new(&mut adapter, 1024, OutputFormat::Object)
        .unwrap()
        .run_with(&mut source, |out, err| outcomes.push((out, err)))
        .await;

    assert_eq!(outcomes.len(), 1);
    let (out, err) = outcomes.pop().unwrap();
    assert_eq!(out, AnalysisOutput::empty());
    let err = err.expect("error delivered");
    assert!(err.is_source_read());
    assert!(err.to_string().contains("disk on fire"));

    // engine left as last observed: initialized, never finalized or closed
    assert_eq!(log.calls(), vec![EngineCall::Init { size: 4096, offset: 0 }]);
    drop(adapter);
}

#[tokio::test]
async fn synchronous_read_failure_rejects_returned_value() {
    let (mut adapter, _log) = bare_adapter(Script::new());
    let mut source = Immediate(FnSource::new(
        || Ok(10),
        |_n, _offset| Err("nope".into()),
    ));

    let result = StreamController::new(&mut adapter, 4, OutputFormat::Text)
        .unwrap()
        .run(&mut source)
        .await;
    assert!(matches!(result, Err(Error::SourceRead { .. })));
}

#[tokio::test(start_paused = true)]
async fn deferred_read_failure_mid_stream() {
    let factory = ScriptedFactory::new(Script::new());
    let mut source = RecordingSource::new(patterned(1000))
        .delivery(Delivery::Delayed(Duration::from_millis(50)))
        .fail_on_read(3);
    let reads = source.reads();

    {
        let mut session = Session::new(&factory, options(100, OutputFormat::Object)).unwrap();
        let err = session.analyze(&mut source).await.unwrap_err();
        assert!(err.is_source_read());
        assert_eq!(err.to_string(), "Source read error: read 3 failed");
    }

    assert_eq!(reads.offsets(), vec![0, 100, 200]);
    let log = factory.log();
    assert_eq!(log.feed_lengths(), vec![100, 100]);
    assert_eq!(log.count(|c| matches!(c, EngineCall::Finalize)), 0);
    // released by the session going out of scope, not by the driver
    assert_eq!(log.count(|c| matches!(c, EngineCall::Close)), 1);
}

#[tokio::test(start_paused = true)]
async fn deferred_size_failure() {
    let factory = ScriptedFactory::new(Script::new());
    let mut source = RecordingSource::new(patterned(10))
        .delivery(Delivery::Delayed(Duration::from_secs(1)))
        .fail_size();

    let mut session = Session::new(&factory, AnalyzeOptions::default()).unwrap();
    let mut delivered = None;
    session
        .analyze_with(&mut source, |out, err| delivered = Some((out, err)))
        .await;

    let (out, err) = delivered.unwrap();
    assert!(out.is_empty());
    assert!(err.unwrap().is_source_read());
    assert!(source.reads().all().is_empty());
}

#[tokio::test]
async fn early_empty_chunk_finalizes_without_error() {
    let factory = ScriptedFactory::new(Script::new());
    let mut source = RecordingSource::new(patterned(1000)).empty_from_read(2);
    let reads = source.reads();

    let mut session = Session::new(&factory, options(100, OutputFormat::Object)).unwrap();
    let out = session.analyze(&mut source).await.unwrap();

    assert_eq!(reads.all().len(), 2);
    let log = factory.log();
    assert_eq!(log.feed_lengths(), vec![100]);
    assert_eq!(log.count(|c| matches!(c, EngineCall::Finalize)), 1);
    assert_eq!(out.as_object().unwrap()["media"]["track"][0]["StreamSize"], "100");
}

#[tokio::test]
async fn empty_source_finalizes_without_reading() {
    let factory = ScriptedFactory::new(Script::new());
    let mut source = RecordingSource::new(Vec::new());
    let reads = source.reads();

    let mut session = Session::new(&factory, options(100, OutputFormat::Json)).unwrap();
    session.analyze(&mut source).await.unwrap();

    assert!(reads.all().is_empty());
    assert_eq!(
        factory.log().calls(),
        vec![
            EngineCall::Init { size: 0, offset: 0 },
            EngineCall::Finalize,
            EngineCall::Inform,
        ]
    );
}

#[tokio::test]
async fn malformed_report_is_format_error() {
    let factory = ScriptedFactory::new(Script::new().report("General\nFormat : AVC\n"));
    let mut source = RecordingSource::new(patterned(10));

    let mut session = Session::new(&factory, options(100, OutputFormat::Object)).unwrap();
    let err = session.analyze(&mut source).await.unwrap_err();
    assert!(matches!(err, Error::Format(_)));
}

// ---------------------------------------------------------------------------
// Delivery and formats
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn deferred_and_immediate_sources_agree() {
    let script = Script::new().seek_after_feed(2, 700).finish_after(500);

    let mut outputs = Vec::new();
    let mut read_logs = Vec::new();
    for delivery in [Delivery::Immediate, Delivery::Delayed(Duration::from_millis(5))] {
        let factory = ScriptedFactory::new(script.clone());
        let mut source = RecordingSource::new(patterned(1000)).delivery(delivery);
        read_logs.push(source.reads());

        let mut session = Session::new(&factory, options(128, OutputFormat::Object)).unwrap();
        outputs.push(session.analyze(&mut source).await.unwrap());
    }

    assert_eq!(outputs[0], outputs[1]);
    assert_eq!(read_logs[0].all(), read_logs[1].all());
    assert_eq!(read_logs[0].offsets(), vec![0, 128, 700, 828]);
}

#[tokio::test]
async fn object_equals_parsed_json_report() {
    let data = patterned(5000);

    let factory = ScriptedFactory::new(Script::new());
    let mut session = Session::new(&factory, options(512, OutputFormat::Object)).unwrap();
    let object = session.analyze(&mut RecordingSource::new(data.clone())).await.unwrap();

    let factory = ScriptedFactory::new(Script::new());
    let mut session = Session::new(&factory, options(512, OutputFormat::Json)).unwrap();
    let json = session.analyze(&mut RecordingSource::new(data)).await.unwrap();

    let reparsed: serde_json::Value = serde_json::from_str(json.as_text().unwrap()).unwrap();
    assert_eq!(object.as_object().unwrap(), &reparsed);
}

#[tokio::test]
async fn text_formats_are_raw_engine_output() {
    for format in [OutputFormat::Xml, OutputFormat::Html, OutputFormat::Text] {
        let raw = format!("raw {format} report\n<not parsed>");
        let factory = ScriptedFactory::new(Script::new().report(raw.clone()));
        let mut session = Session::new(&factory, options(64, format)).unwrap();
        let out = session.analyze(&mut RecordingSource::new(patterned(100))).await.unwrap();
        assert_eq!(out, AnalysisOutput::Text(raw));
    }
}
