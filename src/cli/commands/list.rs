use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::handlers::api::schools::SchoolList;

pub async fn handle(server: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let response = reqwest::get(format!("{}/api/schools", server)).await?;
    if !response.status().is_success() {
        return Err(api_error(response).await);
    }
    let list: SchoolList = response.json().await?;

    if list.schools.is_empty() {
        return output_empty_collection(&output_format, "schools", "No schools found");
    }

    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&list)?);
        }
        OutputFormat::Text => {
            println!("{:<6} {:<25} {:<15} {:<15} {:<12} {}", "ID", "NAME", "CITY", "STATE", "CONTACT", "IMAGE");
            println!("{}", "-".repeat(90));

            for school in &list.schools {
                println!(
                    "{:<6} {:<25} {:<15} {:<15} {:<12} {}",
                    school.id,
                    truncate(&school.name, 25),
                    truncate(&school.city, 15),
                    truncate(&school.state, 15),
                    school.contact,
                    school.image.as_deref().unwrap_or("-")
                );
            }
        }
    }

    Ok(())
}
