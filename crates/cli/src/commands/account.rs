//! Account commands.

use secrecy::SecretString;

use gaming_store_storefront::Storefront;
use gaming_store_storefront::error::AppError;
use gaming_store_storefront::services::RegistrationForm;
use gaming_store_storefront::storage::KeyValueStore;

use crate::render;

fn password(value: Option<String>) -> Result<SecretString, AppError> {
    value
        .filter(|p| !p.is_empty())
        .map(SecretString::from)
        .ok_or_else(|| {
            AppError::BadRequest("Pass --password or set GS_PASSWORD".to_string())
        })
}

/// Sign in.
#[allow(clippy::print_stdout)]
pub async fn login<S: KeyValueStore>(
    store: &Storefront<S>,
    email: &str,
    password_arg: Option<String>,
) -> Result<(), AppError> {
    let password = password(password_arg)?;
    let user = store.login(email, &password).await?;
    println!("Signed in as {}", render::identity(&user));
    Ok(())
}

/// Create an account and sign in.
#[allow(clippy::print_stdout)]
pub async fn register<S: KeyValueStore>(
    store: &Storefront<S>,
    name: String,
    email: String,
    phone: String,
    password_arg: Option<String>,
) -> Result<(), AppError> {
    let form = RegistrationForm {
        name,
        email,
        phone,
        password: password(password_arg)?,
    };
    let user = store.register(&form).await?;
    println!("Welcome, {}", render::identity(&user));
    Ok(())
}

/// Sign out.
#[allow(clippy::print_stdout)]
pub fn logout<S: KeyValueStore>(store: &Storefront<S>) {
    store.logout();
    println!("Signed out");
}

/// Print the signed-in user.
#[allow(clippy::print_stdout)]
pub fn whoami<S: KeyValueStore>(store: &Storefront<S>) {
    match store.account().current() {
        Some(user) => println!("{}", render::identity(&user)),
        None => println!("Not signed in"),
    }
}
