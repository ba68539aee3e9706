//! Account commands.

use cravii_client::ClientContext;
use secrecy::SecretString;

use super::{CommandError, prompt_line};

fn read_secret(prompt: &str) -> Result<SecretString, CommandError> {
    let line = prompt_line(prompt)?.unwrap_or_default();
    Ok(SecretString::from(line))
}

/// Log in with a password read from stdin.
pub async fn login(ctx: &ClientContext, email: &str) -> Result<(), CommandError> {
    let password = read_secret("Password: ")?;
    let session = ctx.auth().login(email, &password).await?;
    println!(
        "Logged in as {} (user {})",
        session.email.as_deref().unwrap_or(email),
        session.user_id
    );
    Ok(())
}

/// Register; the password and its confirmation are read from stdin.
pub async fn signup(ctx: &ClientContext, email: &str) -> Result<(), CommandError> {
    let password = read_secret("Password: ")?;
    let confirm = read_secret("Confirm password: ")?;
    ctx.auth().signup(email, &password, &confirm).await?;
    println!("Welcome to Cravii! Log in with `cravii login {}`.", email.trim());
    Ok(())
}

pub async fn logout(ctx: &ClientContext) -> Result<(), CommandError> {
    ctx.auth().logout().await?;
    println!("Logged out");
    Ok(())
}

pub async fn whoami(ctx: &ClientContext) -> Result<(), CommandError> {
    match ctx.auth().restore().await? {
        Some(session) => {
            println!("User:  {}", session.user_id);
            if let Some(email) = session.email {
                println!("Email: {email}");
            }
            if let Some(at) = session.login_time {
                println!("Since: {}", at.format("%Y-%m-%d %H:%M UTC"));
            }
        }
        None => println!("Not logged in"),
    }
    Ok(())
}
