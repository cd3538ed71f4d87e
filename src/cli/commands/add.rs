use std::path::{Path, PathBuf};

use clap::Args;
use reqwest::multipart::{Form, Part};
use serde_json::json;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::handlers::api::schools::SchoolCreated;

#[derive(Args)]
pub struct AddArgs {
    #[arg(long, help = "School name")]
    pub name: String,
    #[arg(long, help = "Street address")]
    pub address: String,
    #[arg(long, help = "City")]
    pub city: String,
    #[arg(long, help = "State")]
    pub state: String,
    #[arg(long, help = "10-digit contact number")]
    pub contact: String,
    #[arg(long = "email", help = "Contact email address")]
    pub email_id: String,
    #[arg(long, help = "Path to an image file to upload")]
    pub image: Option<PathBuf>,
}

pub async fn handle(server: &str, args: AddArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut form = Form::new()
        .text("name", args.name)
        .text("address", args.address)
        .text("city", args.city)
        .text("state", args.state)
        .text("contact", args.contact)
        .text("email_id", args.email_id);

    if let Some(path) = &args.image {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(guess_content_type(path))?;
        form = form.part("image", part);
    }

    let response = reqwest::Client::new()
        .post(format!("{}/api/schools", server))
        .multipart(form)
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(api_error(response).await);
    }
    let created: SchoolCreated = response.json().await?;

    output_success(
        &output_format,
        &format!("{} (id {})", created.message, created.school_id),
        Some(json!({ "schoolId": created.school_id })),
    )
}

/// Content type from the file extension. Anything unrecognised goes up as
/// octet-stream and the server rejects it.
fn guess_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_follows_extension() {
        assert_eq!(guess_content_type(Path::new("campus.JPG")), "image/jpeg");
        assert_eq!(guess_content_type(Path::new("dir/logo.png")), "image/png");
        assert_eq!(guess_content_type(Path::new("notes.txt")), "application/octet-stream");
        assert_eq!(guess_content_type(Path::new("noext")), "application/octet-stream");
    }
}
