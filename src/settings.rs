//! Profile form shown in the settings dialog.

use crate::store::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    Name,
    Email,
}

impl SettingsField {
    pub fn next(self) -> Self {
        match self {
            SettingsField::Name => SettingsField::Email,
            SettingsField::Email => SettingsField::Name,
        }
    }
}

/// Draft copy of the editable profile fields. Nothing reaches the user until `save`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsForm {
    pub name: String,
    pub email: String,
    pub field: SettingsField,
}

impl SettingsForm {
    pub fn open(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            field: SettingsField::Name,
        }
    }

    fn current_mut(&mut self) -> &mut String {
        match self.field {
            SettingsField::Name => &mut self.name,
            SettingsField::Email => &mut self.email,
        }
    }

    pub fn next_field(&mut self) {
        self.field = self.field.next();
    }

    pub fn insert_char(&mut self, c: char) {
        self.current_mut().push(c);
    }

    pub fn insert_str(&mut self, text: &str) {
        let clean: String = text.chars().filter(|c| !c.is_control()).collect();
        self.current_mut().push_str(&clean);
    }

    pub fn backspace(&mut self) {
        self.current_mut().pop();
    }

    pub fn is_changed(&self, user: &User) -> bool {
        self.name != user.name || self.email != user.email
    }

    /// Commit the draft to `user`. Returns whether anything changed.
    pub fn save(self, user: &mut User) -> bool {
        let changed = self.is_changed(user);
        user.name = self.name;
        user.email = self.email;
        changed
    }
}
