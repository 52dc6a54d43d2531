mod codec;
mod compositor;
mod error;
mod frame;
mod output;
mod pipeline;
mod segmentation;
mod upload;

use anyhow::{Context, Result};
use clap::Parser;
use frame::Frame;
use output::{FileSink, ResultSink};
use pipeline::Pipeline;
use segmentation::{PassthroughModel, SegmentationModel};
use std::path::PathBuf;
use std::process::ExitCode;
use upload::{FileUpload, UploadSource};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Decorative frame the subject is composited onto
    #[arg(short, long, default_value = "images/frame.png")]
    frame: PathBuf,

    /// Photo to process, `-` reads from stdin
    #[arg(short, long, default_value = "-")]
    input: PathBuf,

    /// Where to write the PNG result, `-` writes to stdout
    #[arg(short, long, default_value = "result.png")]
    output: PathBuf,

    /// Path to segmentation model (ONNX file)
    /// If not provided, runs in passthrough mode and the input must already be a cutout
    #[arg(long)]
    model: Option<PathBuf>,

    /// Intra-op threads for ONNX inference
    #[arg(long, default_value_t = 4)]
    threads: usize,

    /// Also save the background-removed cutout to this path
    #[arg(long)]
    save_cutout: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    // stdout may carry the result image, so logs go to stderr
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let client_error = err
                .downcast_ref::<error::PipelineError>()
                .is_some_and(error::PipelineError::is_client_error);
            tracing::error!("{:#}", err);
            if client_error {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run(args: Args) -> Result<()> {
    tracing::info!("Framecut starting");

    // Fatal at startup: nothing can be served without the frame
    let frame = Frame::load(&args.frame).context("Failed to load frame")?;
    let (frame_width, frame_height) = frame.dimensions();
    tracing::info!(
        "Frame: {} ({}x{})",
        frame.path().display(),
        frame_width,
        frame_height
    );

    let model: Box<dyn SegmentationModel> = if let Some(model_path) = &args.model {
        tracing::info!("Loading segmentation model from {}", model_path.display());
        let model = segmentation::create_default_model(model_path, args.threads)
            .context("Failed to load segmentation model")?;
        tracing::info!("Segmentation model loaded successfully");
        model
    } else {
        tracing::info!("Running in passthrough mode (no segmentation)");
        Box::new(PassthroughModel)
    };

    let mut upload = FileUpload::new(&args.input);
    let mut sink = FileSink::new(&args.output);
    let mut pipeline = Pipeline::new(&frame, model);

    handle_request(&mut upload, &mut sink, &mut pipeline, args.save_cutout.as_ref())
}

fn handle_request<U, S>(
    upload: &mut U,
    sink: &mut S,
    pipeline: &mut Pipeline<'_>,
    save_cutout: Option<&PathBuf>,
) -> Result<()>
where
    U: UploadSource,
    S: ResultSink,
{
    tracing::info!("Reading upload from {}", upload.describe());
    let bytes = upload.read_upload()?;

    let processed = pipeline.process(&bytes)?;

    if let Some(path) = save_cutout {
        FileSink::new(path)
            .write_result(&processed.cutout)
            .context("Failed to save cutout")?;
        tracing::info!("Cutout saved to {}", path.display());
    }

    sink.write_result(&processed.png)?;

    let t = processed.timings;
    tracing::info!(
        "Done with {}: decode={:.1}ms, segment={:.1}ms, composite={:.1}ms, encode={:.1}ms, total={:.1}ms -> {}",
        pipeline.model_name(),
        t.decode.as_secs_f64() * 1000.0,
        t.segment.as_secs_f64() * 1000.0,
        t.composite.as_secs_f64() * 1000.0,
        t.encode.as_secs_f64() * 1000.0,
        t.total().as_secs_f64() * 1000.0,
        sink.describe()
    );

    Ok(())
}
