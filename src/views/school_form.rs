use super::{escape, layout};
use crate::services::SchoolSubmission;

/// Result banner shown above the form after a submission
pub enum Banner {
    Success(String),
    Error(String),
}

/// Values echoed back into the inputs after a failed submission
#[derive(Debug, Default, Clone)]
pub struct FormValues {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub contact: String,
    pub email_id: String,
}

impl From<&SchoolSubmission> for FormValues {
    fn from(submission: &SchoolSubmission) -> Self {
        let value = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            name: value(&submission.name),
            address: value(&submission.address),
            city: value(&submission.city),
            state: value(&submission.state),
            contact: value(&submission.contact),
            email_id: value(&submission.email_id),
        }
    }
}

/// The add-school form. The constraint attributes only give the user early
/// feedback; the server validates every submission itself.
pub fn render(banner: Option<&Banner>, values: &FormValues) -> String {
    let banner = match banner {
        Some(Banner::Success(message)) => format!(r#"<div class="success-message">{}</div>"#, escape(message)),
        Some(Banner::Error(message)) => format!(r#"<div class="error-message">{}</div>"#, escape(message)),
        None => String::new(),
    };

    let content = format!(
        r#"<div class="container">
<div class="form-container">
<h1 class="form-title">Add New School</h1>
{banner}
<form method="post" action="/addSchool" enctype="multipart/form-data">
  <div class="form-group">
    <label class="form-label" for="name">School Name *</label>
    <input id="name" name="name" type="text" class="form-input" placeholder="Enter school name"
           required minlength="2" maxlength="100" value="{name}">
  </div>
  <div class="form-group">
    <label class="form-label" for="address">Address *</label>
    <textarea id="address" name="address" class="form-input" rows="3" placeholder="Enter complete address"
              required minlength="10">{address}</textarea>
  </div>
  <div class="form-group">
    <label class="form-label" for="city">City *</label>
    <input id="city" name="city" type="text" class="form-input" placeholder="Enter city name"
           required minlength="2" pattern="[a-zA-Z\s]+" title="City should only contain letters and spaces" value="{city}">
  </div>
  <div class="form-group">
    <label class="form-label" for="state">State *</label>
    <input id="state" name="state" type="text" class="form-input" placeholder="Enter state name"
           required minlength="2" pattern="[a-zA-Z\s]+" title="State should only contain letters and spaces" value="{state}">
  </div>
  <div class="form-group">
    <label class="form-label" for="contact">Contact Number *</label>
    <input id="contact" name="contact" type="tel" class="form-input" placeholder="Enter 10-digit contact number"
           required pattern="[6-9][0-9]{{9}}" title="Please enter a valid 10-digit Indian mobile number" value="{contact}">
  </div>
  <div class="form-group">
    <label class="form-label" for="email_id">Email Address *</label>
    <input id="email_id" name="email_id" type="email" class="form-input" placeholder="Enter email address"
           required value="{email_id}">
  </div>
  <div class="form-group">
    <label class="form-label" for="image">School Image (Optional)</label>
    <input id="image" name="image" type="file" class="form-input"
           accept="image/jpeg,image/jpg,image/png,image/gif">
    <small class="form-hint">Supported formats: JPEG, PNG, GIF (Max size: 5MB)</small>
  </div>
  <button type="submit" class="btn">✅ Add School</button>
</form>
</div>
</div>
<script>
document.getElementById('image').addEventListener('change', function (e) {{
  var file = e.target.files[0];
  var allowed = ['image/jpeg', 'image/jpg', 'image/png', 'image/gif'];
  if (file && file.size > 5000000) {{
    e.target.setCustomValidity('Image size must be less than 5MB');
  }} else if (file && allowed.indexOf(file.type) === -1) {{
    e.target.setCustomValidity('Only JPEG, PNG, and GIF images are allowed');
  }} else {{
    e.target.setCustomValidity('');
  }}
  e.target.reportValidity();
}});
</script>"#,
        name = escape(&values.name),
        address = escape(&values.address),
        city = escape(&values.city),
        state = escape(&values.state),
        contact = escape(&values.contact),
        email_id = escape(&values.email_id),
    );

    layout("Add School", &content)
}
