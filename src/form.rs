//! Editor and sign-in forms.
//!
//! Controlled form state with client-side validation. Validation here is a
//! convenience for the user; the backend stays authoritative.

use crate::snippet::{Language, Snippet, SnippetDraft};

/// Fields of the snippet editor, in focus order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnippetField {
    Title,
    Language,
    Code,
    Description,
    Tags,
}

impl SnippetField {
    const ORDER: [SnippetField; 5] = [
        SnippetField::Title,
        SnippetField::Language,
        SnippetField::Code,
        SnippetField::Description,
        SnippetField::Tags,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn previous(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    /// Whether Enter inserts a line break in this field.
    pub fn is_multiline(self) -> bool {
        matches!(self, SnippetField::Code | SnippetField::Description)
    }
}

/// Per-field validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    pub title: Option<String>,
    pub code: Option<String>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.code.is_none()
    }
}

/// State of the snippet editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetForm {
    pub title: String,
    pub language: Language,
    pub code: String,
    pub description: String,
    /// Comma separated tags, as typed
    pub tags: String,
    pub focus: SnippetField,
    pub errors: FormErrors,
    /// Snippet being edited; None for a new snippet
    pub editing: Option<String>,
    is_favorite: bool,
}

impl Default for SnippetForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            language: Language::JavaScript,
            code: String::new(),
            description: String::new(),
            tags: String::new(),
            focus: SnippetField::Title,
            errors: FormErrors::default(),
            editing: None,
            is_favorite: false,
        }
    }
}

impl SnippetForm {
    /// Empty form for a new snippet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Form pre-filled from an existing snippet.
    pub fn edit(snippet: &Snippet) -> Self {
        Self {
            title: snippet.title.clone(),
            language: snippet.language.clone(),
            code: snippet.code.clone(),
            description: snippet.description.clone().unwrap_or_default(),
            tags: snippet.tags.join(", "),
            editing: Some(snippet.id.clone()),
            is_favorite: snippet.is_favorite,
            ..Self::default()
        }
    }

    pub fn is_new(&self) -> bool {
        self.editing.is_none()
    }

    /// Check required fields and record messages.
    ///
    /// # Returns
    /// * `bool` - True when the form can be submitted
    pub fn validate(&mut self) -> bool {
        let mut errors = FormErrors::default();
        if self.title.trim().is_empty() {
            errors.title = Some("Title is required".to_string());
        }
        if self.code.trim().is_empty() {
            errors.code = Some("Code is required".to_string());
        }
        self.errors = errors;
        self.errors.is_empty()
    }

    /// Validate and convert to a draft.
    ///
    /// # Returns
    /// * `Result<SnippetDraft, FormErrors>` - Draft to save, or the validation messages
    ///
    /// # Details
    /// Tags are split on commas and trimmed, empty entries dropped. An empty
    /// description is stored as null. The favorite flag of an edited snippet
    /// is preserved.
    pub fn submit(&mut self) -> Result<SnippetDraft, FormErrors> {
        if !self.validate() {
            return Err(self.errors.clone());
        }
        Ok(SnippetDraft {
            title: self.title.clone(),
            language: self.language.clone(),
            code: self.code.clone(),
            description: if self.description.is_empty() {
                None
            } else {
                Some(self.description.clone())
            },
            tags: parse_tags(&self.tags),
            is_favorite: self.is_favorite,
        })
    }

    fn focused_text(&mut self) -> Option<&mut String> {
        match self.focus {
            SnippetField::Title => Some(&mut self.title),
            SnippetField::Language => None,
            SnippetField::Code => Some(&mut self.code),
            SnippetField::Description => Some(&mut self.description),
            SnippetField::Tags => Some(&mut self.tags),
        }
    }

    pub fn insert_char(&mut self, ch: char) {
        if let Some(text) = self.focused_text() {
            text.push(ch);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(text) = self.focused_text() {
            text.pop();
        }
    }

    /// Line break in multi-line fields; ignored elsewhere.
    pub fn newline(&mut self) {
        if self.focus.is_multiline() {
            self.insert_char('\n');
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_previous(&mut self) {
        self.focus = self.focus.previous();
    }

    pub fn next_language(&mut self) {
        self.language = self.language.next();
    }

    pub fn previous_language(&mut self) {
        self.language = self.language.previous();
    }
}

/// Split comma separated tags.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Sign-in screen variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    SignIn,
    SignUp,
}

/// Fields of the sign-in form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    FullName,
    Email,
    Password,
}

/// Credentials ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

/// State of the sign-in / sign-up form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub focus: AuthField,
}

impl Default for AuthForm {
    fn default() -> Self {
        Self {
            mode: AuthMode::SignIn,
            full_name: String::new(),
            email: String::new(),
            password: String::new(),
            focus: AuthField::Email,
        }
    }
}

impl AuthForm {
    /// Switch between sign-in and sign-up, keeping typed credentials.
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::SignIn => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::SignIn,
        };
        if self.mode == AuthMode::SignIn && self.focus == AuthField::FullName {
            self.focus = AuthField::Email;
        }
    }

    /// Fields shown in the current mode, in focus order.
    pub fn fields(&self) -> &'static [AuthField] {
        match self.mode {
            AuthMode::SignIn => &[AuthField::Email, AuthField::Password],
            AuthMode::SignUp => &[AuthField::FullName, AuthField::Email, AuthField::Password],
        }
    }

    pub fn focus_next(&mut self) {
        let fields = self.fields();
        let i = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(i + 1) % fields.len()];
    }

    pub fn focus_previous(&mut self) {
        let fields = self.fields();
        let i = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(i + fields.len() - 1) % fields.len()];
    }

    fn focused_text(&mut self) -> &mut String {
        match self.focus {
            AuthField::FullName => &mut self.full_name,
            AuthField::Email => &mut self.email,
            AuthField::Password => &mut self.password,
        }
    }

    pub fn insert_char(&mut self, ch: char) {
        self.focused_text().push(ch);
    }

    pub fn backspace(&mut self) {
        self.focused_text().pop();
    }

    /// Validate and return the credentials.
    ///
    /// # Returns
    /// * `Result<Credentials, String>` - Credentials, or the first validation message
    pub fn submit(&self) -> Result<Credentials, String> {
        let email = self.email.trim();
        if !is_valid_email(email) {
            return Err("Invalid email address".to_string());
        }
        if self.password.chars().count() < 6 {
            return Err("Password must be at least 6 characters".to_string());
        }
        let full_name = self.full_name.trim();
        Ok(Credentials {
            email: email.to_string(),
            password: self.password.clone(),
            full_name: (self.mode == AuthMode::SignUp && !full_name.is_empty())
                .then(|| full_name.to_string()),
        })
    }

    /// Forget the password after a submit.
    pub fn clear_password(&mut self) {
        self.password.clear();
    }
}

/// Minimal `local@domain.tld` shape check.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !email.chars().any(char::is_whitespace)
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(name, _)| !name.is_empty())
        && !domain.ends_with('.')
}
