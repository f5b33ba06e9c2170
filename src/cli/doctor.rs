//! `nais doctor`

use super::commands::GlobalArgs;
use super::display::TableRenderer;
use super::migrate::connect;
use crate::domain::config::Settings;
use crate::domain::doctor::{has_failures, Doctor};
use crate::infrastructure::image::ImageResolver;
use clap::Parser;
use std::sync::Arc;

#[derive(Parser, Debug, Clone)]
pub struct DoctorCommand {
    /// Also check that this application has a Cloud SQL instance to migrate
    #[arg(long)]
    pub app: Option<String>,
}

impl DoctorCommand {
    pub async fn execute(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let settings = Settings::load(global.config_file.as_deref())?;
        let client = connect(global).await?;
        let images: Arc<dyn ImageResolver> = Arc::from(settings.image_resolver()?);

        let results = Doctor::new(client, images, self.app.clone()).run().await;
        println!("{}", TableRenderer::new().render_doctor_report(&results));

        if has_failures(&results) {
            anyhow::bail!("one or more checks failed");
        }
        Ok(())
    }
}
