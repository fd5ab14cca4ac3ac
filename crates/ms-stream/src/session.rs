//! [`Session`]: owns one engine instance and runs analyses against it.

use ms_core::{AnalyzeOptions, Error, Result};
use ms_engine::{Engine, EngineAdapter, EngineFactory, EngineSettings};

use crate::controller::StreamController;
use crate::report::AnalysisOutput;
use crate::source::ChunkSource;

/// One engine instance plus the options it was created with.
///
/// The session is the owner the streaming driver defers to for cleanup:
/// [`close`](Session::close) releases the engine, and dropping an unclosed
/// session releases it too, so every exit path (including a failed
/// analysis) gives the instance back.
#[derive(Debug)]
pub struct Session<E: Engine> {
    adapter: EngineAdapter<E>,
    options: AnalyzeOptions,
}

impl<E: Engine> Session<E> {
    /// Create an engine instance configured from `options`.
    pub fn new<F>(factory: &F, options: AnalyzeOptions) -> Result<Self>
    where
        F: EngineFactory<Engine = E>,
    {
        options.check()?;
        let settings = EngineSettings::from(&options);
        let engine = factory.create(settings)?;
        tracing::debug!(
            engine = factory.name(),
            format = %options.format,
            chunk_size = options.chunk_size,
            full = options.full,
            cover_data = options.cover_data,
            "session created"
        );
        Ok(Self {
            adapter: EngineAdapter::new(engine, settings),
            options,
        })
    }

    pub fn options(&self) -> &AnalyzeOptions {
        &self.options
    }

    fn controller(&mut self) -> Result<StreamController<'_, E>> {
        let chunk_size = usize::try_from(self.options.chunk_size)
            .map_err(|_| {
                Error::Config(format!("chunk_size {} too large", self.options.chunk_size))
            })?;
        StreamController::new(&mut self.adapter, chunk_size, self.options.format)
    }

    /// Analyse `source` chunk by chunk and return the formatted report.
    pub async fn analyze<S>(&mut self, source: &mut S) -> Result<AnalysisOutput>
    where
        S: ChunkSource + ?Sized,
    {
        self.controller()?.run(source).await
    }

    /// Analyse `source` and deliver the outcome to `callback` instead of
    /// returning it. See [`StreamController::run_with`].
    pub async fn analyze_with<S, F>(&mut self, source: &mut S, callback: F)
    where
        S: ChunkSource + ?Sized,
        F: FnOnce(AnalysisOutput, Option<Error>),
    {
        match self.controller() {
            Ok(controller) => controller.run_with(source, callback).await,
            Err(err) => callback(AnalysisOutput::empty(), Some(err)),
        }
    }

    /// Release the engine instance.
    pub fn close(self) {
        self.adapter.dispose();
    }
}

/// Create a session, analyse one source, and release the engine whatever
/// the outcome.
pub async fn analyze<F, S>(
    factory: &F,
    options: AnalyzeOptions,
    source: &mut S,
) -> Result<AnalysisOutput>
where
    F: EngineFactory,
    S: ChunkSource + ?Sized,
{
    let mut session = Session::new(factory, options)?;
    let result = session.analyze(source).await;
    session.close();
    result
}
