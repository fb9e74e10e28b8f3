//! Raw request inputs handed from the HTTP layer to validators and use cases.
//! Every field is optional so missing values surface as field errors.

#[derive(Debug, Clone, Default)]
pub struct RegisterInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirm: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LoginInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileFieldsInput {
    pub bio: Option<String>,
    /// `Some(None)` clears the avatar.
    pub avatar: Option<Option<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileUpdateInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile: Option<ProfileFieldsInput>,
}

#[derive(Debug, Clone, Default)]
pub struct ChangePasswordInput {
    pub old_password: Option<String>,
    pub new_password: Option<String>,
    pub new_password_confirm: Option<String>,
}
