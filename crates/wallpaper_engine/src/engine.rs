use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info};
use tokio_util::sync::CancellationToken;

use crate::export::export_wallpaper;
use crate::poller::{ChannelProgressSink, Poller};
use crate::stitch::TileStitcher;
use crate::{EngineEvent, ExportRequest};

enum EngineCommand {
    RunPrediction {
        prompt: String,
        width: u32,
        height: u32,
    },
    Export(ExportRequest),
    Cancel,
}

/// Owns a tokio runtime on a background thread and executes IO on request.
///
/// Results come back as [`EngineEvent`]s through [`EngineHandle::try_recv`]
/// or [`EngineHandle::recv_timeout`].
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(
        poller: Poller,
        stitcher: TileStitcher,
        output_dir: PathBuf,
    ) -> std::io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()?;

        thread::Builder::new()
            .name("wallpaper-engine".into())
            .spawn(move || {
                let mut active: Option<CancellationToken> = None;
                while let Ok(command) = cmd_rx.recv() {
                    match command {
                        EngineCommand::RunPrediction {
                            prompt,
                            width,
                            height,
                        } => {
                            let token = CancellationToken::new();
                            if let Some(previous) = active.replace(token.clone()) {
                                previous.cancel();
                            }
                            let poller = poller.clone();
                            let event_tx = event_tx.clone();
                            runtime.spawn(async move {
                                let sink = ChannelProgressSink::new(event_tx.clone());
                                let result =
                                    poller.run(&prompt, width, height, &sink, &token).await;
                                let _ = event_tx.send(EngineEvent::JobCompleted { result });
                            });
                        }
                        EngineCommand::Export(request) => {
                            let stitcher = stitcher.clone();
                            let output_dir = output_dir.clone();
                            let event_tx = event_tx.clone();
                            runtime.spawn(async move {
                                let result =
                                    export_wallpaper(&stitcher, &request, &output_dir).await;
                                let _ = event_tx.send(EngineEvent::ExportCompleted { result });
                            });
                        }
                        EngineCommand::Cancel => {
                            if let Some(token) = active.take() {
                                engine_info!("Cancelling active prediction");
                                token.cancel();
                            }
                        }
                    }
                }
                engine_debug!("Engine command channel closed");
            })?;

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn run_prediction(&self, prompt: impl Into<String>, width: u32, height: u32) {
        let _ = self.cmd_tx.send(EngineCommand::RunPrediction {
            prompt: prompt.into(),
            width,
            height,
        });
    }

    pub fn export(&self, request: ExportRequest) {
        let _ = self.cmd_tx.send(EngineCommand::Export(request));
    }

    pub fn cancel(&self) {
        let _ = self.cmd_tx.send(EngineCommand::Cancel);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}
