use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};

use crate::core::{OptimizeOptions, OptimizeStatus, OptimizerConfig, ProcessOptions};
use crate::exec::{CommandRunner, ExecOutput, ExecQueue, Invocation, SystemRunner};
use crate::processing::{exiftool, jpegmini};
use crate::utils::{move_file, random_output_path, OptimizerError, OptimizerResult};

/// Drives the optimizer and metadata binaries.
///
/// Optimizer-binary invocations are funneled through one [`ExecQueue`] so at
/// most `config.concurrency` of them run at a time; metadata lookups are
/// cheap and go straight to the runner, matching the upstream tool's behavior.
#[derive(Clone)]
pub struct Optimizer {
    config: OptimizerConfig,
    queue: ExecQueue,
    runner: Arc<dyn CommandRunner>,
}

impl Optimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        Self::with_runner(config, Arc::new(SystemRunner))
    }

    pub fn with_runner(config: OptimizerConfig, runner: Arc<dyn CommandRunner>) -> Self {
        let queue = ExecQueue::new(config.concurrency);
        Self {
            config,
            queue,
            runner,
        }
    }

    /// Current optimizer-binary concurrency limit.
    pub fn concurrency(&self) -> usize {
        self.queue.limit()
    }

    /// Adjusts the concurrency limit; in-flight invocations are unaffected.
    pub fn set_concurrency(&self, limit: usize) {
        debug!("Setting optimizer concurrency to {}", limit);
        self.queue.set_limit(limit);
    }

    /// Optimizes a single image in place.
    ///
    /// Skips files already carrying the optimized tag. Otherwise the binary
    /// writes to a random temp path in `opts.tmp_dir`, and the temp file then
    /// replaces the original (copy + delete when the rename crosses devices).
    pub async fn optimize(
        &self,
        path: impl AsRef<Path>,
        opts: &OptimizeOptions,
    ) -> OptimizerResult<OptimizeStatus> {
        let path = path.as_ref();
        self.validate_input_file(path).await?;

        if self.is_optimized(path).await? {
            debug!("Skipping already optimized file: {}", path.display());
            return Ok(OptimizeStatus::AlreadyOptimized);
        }

        let tmp_output = random_output_path(&opts.tmp_dir);
        let process_opts = ProcessOptions {
            input: path.to_path_buf(),
            output: Some(tmp_output.clone()),
            recurse: true,
            quality: opts.quality,
            resize: opts.resize,
            skip_compressed: opts.skip_compressed,
            remove_metadata: opts.remove_metadata,
            license_cache: opts.license_cache.clone(),
        };
        self.process(&process_opts).await?;

        move_file(&tmp_output, path).await?;
        info!("Optimized {}", path.display());
        Ok(OptimizeStatus::Optimized)
    }

    /// One run of the optimizer binary with explicit input/output.
    pub async fn process(&self, opts: &ProcessOptions) -> OptimizerResult<()> {
        if !crate::utils::file_exists(&opts.input).await {
            return Err(OptimizerError::validation(format!(
                "Input not found: {}",
                opts.input.display()
            )));
        }
        let invocation = Invocation::new(&self.config.jpegmini_bin, jpegmini::process_args(opts));
        self.run_queued(invocation).await?;
        Ok(())
    }

    /// Logs out the license cache at `cache_path`.
    ///
    /// The binary reports error code 7032 when the cache holds no active
    /// session; that counts as a successful logout.
    pub async fn logout(&self, cache_path: impl AsRef<Path>) -> OptimizerResult<()> {
        let invocation = Invocation::new(
            &self.config.jpegmini_bin,
            jpegmini::logout_args(cache_path.as_ref()),
        );
        match self.run_queued(invocation).await {
            Ok(_) => Ok(()),
            Err(OptimizerError::Exec { ref detail, .. })
                if detail.contains(jpegmini::LOGOUT_LICENSE_CODE) =>
            {
                debug!("Logout reported code {}, treating as success", jpegmini::LOGOUT_LICENSE_CODE);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Whether the file's comment tag marks it as already optimized.
    pub async fn is_optimized(&self, path: impl AsRef<Path>) -> OptimizerResult<bool> {
        let invocation = Invocation::new(
            &self.config.exiftool_bin,
            exiftool::read_comment_args(path.as_ref()),
        );
        let output = self.runner.run(invocation).await?;
        Ok(exiftool::comment_marks_optimized(&output.stdout))
    }

    /// Writes the optimized tag into the file's comment field.
    pub async fn mark_optimized(&self, path: impl AsRef<Path>) -> OptimizerResult<()> {
        let invocation = Invocation::new(
            &self.config.exiftool_bin,
            exiftool::write_comment_args(path.as_ref()),
        );
        self.runner.run(invocation).await?;
        Ok(())
    }

    /// Dispatches an optimizer-binary invocation through the bounded queue.
    async fn run_queued(&self, invocation: Invocation) -> OptimizerResult<ExecOutput> {
        let runner = Arc::clone(&self.runner);
        self.queue
            .submit(move || async move { runner.run(invocation).await })
            .await?
    }

    async fn validate_input_file(&self, path: &Path) -> OptimizerResult<()> {
        match fs::metadata(path).await {
            Ok(meta) if meta.is_file() => Ok(()),
            Ok(_) => Err(OptimizerError::validation(format!(
                "Not a file: {}",
                path.display()
            ))),
            Err(_) => Err(OptimizerError::validation(format!(
                "Input not found: {}",
                path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned responses and records every invocation. When asked, it
    /// also creates the `-o=` output file so the rename step has something to
    /// move, standing in for the real binary's side effect.
    struct ScriptedRunner {
        responses: Mutex<VecDeque<OptimizerResult<ExecOutput>>>,
        calls: Mutex<Vec<Invocation>>,
        touch_output: bool,
    }

    impl ScriptedRunner {
        fn new(responses: Vec<OptimizerResult<ExecOutput>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
                touch_output: false,
            })
        }

        fn with_touch_output(responses: Vec<OptimizerResult<ExecOutput>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
                touch_output: true,
            })
        }

        fn calls(&self) -> Vec<Invocation> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn run(&self, invocation: Invocation) -> OptimizerResult<ExecOutput> {
            if self.touch_output {
                if let Some(out) = invocation.args.iter().find_map(|a| a.strip_prefix("-o=")) {
                    std::fs::write(out, b"optimized bytes").unwrap();
                }
            }
            self.calls.lock().unwrap().push(invocation);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(ok_output("")))
        }
    }

    fn ok_output(stdout: &str) -> ExecOutput {
        ExecOutput {
            code: Some(0),
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    fn exec_err(detail: &str) -> OptimizerError {
        OptimizerError::exec("jpegmini", Some(1), detail)
    }

    fn optimizer(runner: Arc<ScriptedRunner>) -> Optimizer {
        Optimizer::with_runner(OptimizerConfig::default(), runner)
    }

    #[tokio::test]
    async fn logout_license_code_is_treated_as_success() {
        let runner = ScriptedRunner::new(vec![Err(exec_err("JPEGmini error code: 7032"))]);
        let opt = optimizer(Arc::clone(&runner));

        opt.logout("/var/lic").await.unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "jpegmini");
        assert_eq!(calls[0].args, vec!["-lc_logout=/var/lic", "-f=/tmp/_.jpg"]);
    }

    #[tokio::test]
    async fn logout_other_errors_propagate() {
        let runner = ScriptedRunner::new(vec![Err(exec_err("JPEGmini error code: 1001"))]);
        let err = optimizer(runner).logout("/var/lic").await.unwrap_err();
        assert!(matches!(err, OptimizerError::Exec { .. }));
    }

    #[tokio::test]
    async fn optimize_skips_files_already_tagged() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("a.jpg");
        std::fs::write(&image, b"original").unwrap();

        let runner = ScriptedRunner::new(vec![Ok(ok_output(
            "Comment                         : Optimized by JPEGmini 2.0\n",
        ))]);
        let opt = optimizer(Arc::clone(&runner));

        let status = opt.optimize(&image, &OptimizeOptions::default()).await.unwrap();

        assert_eq!(status, OptimizeStatus::AlreadyOptimized);
        // Only the metadata lookup ran; the optimizer binary was never invoked.
        assert_eq!(runner.calls().len(), 1);
        assert_eq!(runner.calls()[0].program, "exiftool");
        assert_eq!(std::fs::read(&image).unwrap(), b"original");
    }

    #[tokio::test]
    async fn optimize_processes_and_replaces_the_original() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("a.jpg");
        std::fs::write(&image, b"original").unwrap();

        let runner = ScriptedRunner::with_touch_output(vec![
            Ok(ok_output("Comment                         : -\n")),
            Ok(ok_output("")),
        ]);
        let opt = optimizer(Arc::clone(&runner));

        let opts = OptimizeOptions {
            tmp_dir: dir.path().to_path_buf(),
            ..OptimizeOptions::default()
        };
        let status = opt.optimize(&image, &opts).await.unwrap();

        assert_eq!(status, OptimizeStatus::Optimized);
        assert_eq!(std::fs::read(&image).unwrap(), b"optimized bytes");

        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].program, "jpegmini");
        assert_eq!(calls[1].args[0], format!("-f={}", image.display()));
        let tmp_arg = calls[1].args[1].strip_prefix("-o=").unwrap();
        // The temp output was moved over the original, nothing left behind.
        assert!(!Path::new(tmp_arg).exists());
    }

    #[tokio::test]
    async fn optimize_missing_input_is_a_validation_error() {
        let runner = ScriptedRunner::new(vec![]);
        let opt = optimizer(Arc::clone(&runner));

        let err = opt
            .optimize("/nope/missing.jpg", &OptimizeOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, OptimizerError::Validation(_)));
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn process_failure_aborts_that_file() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("a.jpg");
        std::fs::write(&image, b"original").unwrap();

        let runner = ScriptedRunner::new(vec![
            Ok(ok_output("")),
            Err(exec_err("out of licenses")),
        ]);
        let opt = optimizer(runner);

        let opts = OptimizeOptions {
            tmp_dir: dir.path().to_path_buf(),
            ..OptimizeOptions::default()
        };
        let err = opt.optimize(&image, &opts).await.unwrap_err();

        assert!(matches!(err, OptimizerError::Exec { .. }));
        assert_eq!(std::fs::read(&image).unwrap(), b"original");
    }

    #[tokio::test]
    async fn mark_optimized_writes_the_comment_tag() {
        let runner = ScriptedRunner::new(vec![Ok(ok_output(""))]);
        let opt = optimizer(Arc::clone(&runner));

        opt.mark_optimized("/photos/a.jpg").await.unwrap();

        let calls = runner.calls();
        assert_eq!(calls[0].program, "exiftool");
        assert_eq!(
            calls[0].args,
            vec![
                "-comment=Optimized by JPEGmini",
                "-overwrite_original",
                "/photos/a.jpg",
            ]
        );
    }

    #[tokio::test]
    async fn set_concurrency_updates_the_queue_limit() {
        let opt = optimizer(ScriptedRunner::new(vec![]));
        assert_eq!(opt.concurrency(), 1);
        opt.set_concurrency(4);
        assert_eq!(opt.concurrency(), 4);
    }
}
