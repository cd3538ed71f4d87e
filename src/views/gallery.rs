use super::{escape, layout};
use crate::database::School;

/// Shown when a record has no image or its image fails to load
pub const PLACEHOLDER_IMAGE: &str = "/placeholder-school.svg";
/// URL path local-mode images are served from
pub const LOCAL_IMAGE_PREFIX: &str = "/schoolImages/";
const REMOTE_IMAGE_PREFIX: &str = "https://";

/// Turn a stored image reference into something an `<img src>` can load.
pub fn resolve_image_src(image: Option<&str>) -> String {
    match image.map(str::trim) {
        None | Some("") => PLACEHOLDER_IMAGE.to_string(),
        Some(url) if url.starts_with(REMOTE_IMAGE_PREFIX) => url.to_string(),
        Some(filename) => format!("{LOCAL_IMAGE_PREFIX}{filename}"),
    }
}

pub fn render_card(school: &School) -> String {
    let src = resolve_image_src(school.image.as_deref());
    format!(
        r#"<div class="school-card">
  <img src="{src}" alt="{name}" class="school-image" onerror="this.onerror=null;this.src='{PLACEHOLDER_IMAGE}';">
  <div class="school-info">
    <h3 class="school-name">{name}</h3>
    <p class="school-address">{address}</p>
    <p class="school-city">{city}, {state}</p>
  </div>
</div>"#,
        src = escape(&src),
        name = escape(&school.name),
        address = escape(&school.address),
        city = escape(&school.city),
        state = escape(&school.state),
    )
}

pub fn render(schools: &[School]) -> String {
    let content = if schools.is_empty() {
        r#"<div class="no-schools">
  <p>📚 No schools found. <a href="/addSchool">Add the first school</a>!</p>
</div>"#
            .to_string()
    } else {
        let plural = if schools.len() == 1 { "" } else { "s" };
        let cards: String = schools.iter().map(render_card).collect::<Vec<_>>().join("\n");
        format!(
            r#"<p class="schools-count">Found {count} school{plural}</p>
<div class="schools-grid">
{cards}
</div>"#,
            count = schools.len(),
        )
    };

    layout(
        "Our Schools",
        &format!(r#"<div class="container"><h1 class="page-title">Our Schools</h1>{content}</div>"#),
    )
}

pub fn render_error(message: &str) -> String {
    layout(
        "Our Schools",
        &format!(
            r#"<div class="container"><div class="error-message">❌ {}</div></div>"#,
            escape(message)
        ),
    )
}
