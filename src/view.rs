use async_trait::async_trait;

use crate::phase::CountdownFrame;

/// Consumes one frame per tick. Rendering must never fail the pipeline.
#[async_trait]
pub trait CountdownView: Send + Sync {
    async fn render(&self, frame: &CountdownFrame);
}

/// Side effect fired on entering/leaving the elapsed phase. Failures are
/// reported to the caller but never block the display.
#[async_trait]
pub trait CelebrationEffect: Send + Sync {
    async fn start(&self) -> anyhow::Result<()>;
    async fn stop(&self) -> anyhow::Result<()>;
}

pub struct ConsoleView;

#[async_trait]
impl CountdownView for ConsoleView {
    async fn render(&self, frame: &CountdownFrame) {
        if frame.show_meta {
            println!(
                "{}  |  {}  [target {} | now {}]",
                frame.display, frame.status, frame.target_text, frame.now_text
            );
        } else {
            println!("{}  |  {}", frame.display, frame.status);
        }
    }
}

pub struct LogCelebration;

#[async_trait]
impl CelebrationEffect for LogCelebration {
    async fn start(&self) -> anyhow::Result<()> {
        log::info!("Celebration started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        log::info!("Celebration stopped");
        Ok(())
    }
}
