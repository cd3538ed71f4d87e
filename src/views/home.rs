use super::layout;

pub fn render() -> String {
    layout(
        "Home",
        r#"<div class="hero-section">
  <div class="container">
    <h1 class="hero-title">School Management System</h1>
    <p class="hero-description">
      Easily manage and organize school information. Add new schools with
      detailed information and browse through all registered schools.
    </p>
    <div class="hero-buttons">
      <a class="btn" href="/addSchool">➕ Add New School</a>
      <a class="btn" href="/showSchools">👁️ View All Schools</a>
    </div>
  </div>
</div>"#,
    )
}
