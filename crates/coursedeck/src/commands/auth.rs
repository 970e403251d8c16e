//! Login, logout, and the current user.

use secrecy::SecretString;

use coursedeck_core::{AppContext, User};

use crate::cli::{GlobalOpts, LoginArgs};
use crate::error::CliError;
use crate::output;

fn user_detail(u: &User) -> String {
    use std::fmt::Write;
    let mut out = String::new();
    let _ = write!(out, "Email:   {}", u.email);
    if let Some(id) = u.id {
        let _ = write!(out, "\nID:      {id}");
    }
    if let Some(ref picture) = u.picture_url {
        let _ = write!(out, "\nPicture: {picture}");
    }
    out
}

pub async fn login(ctx: &AppContext, args: LoginArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let password = match args.password {
        Some(password) => password,
        None => rpassword::prompt_password("Password: ")?,
    };
    if password.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "cannot be empty".into(),
        });
    }

    let user = ctx
        .auth
        .login(&args.email, &SecretString::from(password))
        .await?;

    if !global.quiet {
        eprintln!("Logged in as {}", user.email);
    }
    Ok(())
}

pub fn logout(ctx: &AppContext, global: &GlobalOpts) -> Result<(), CliError> {
    let was_logged_in = ctx.auth.is_logged_in();
    ctx.auth.logout()?;
    if !global.quiet {
        if was_logged_in {
            eprintln!("Logged out");
        } else {
            eprintln!("Not logged in");
        }
    }
    Ok(())
}

pub fn whoami(ctx: &AppContext, global: &GlobalOpts) -> Result<(), CliError> {
    let user = ctx.auth.current_user().ok_or(CliError::NotLoggedIn)?;
    let out = output::render_single(&global.output, user.as_ref(), user_detail, |u| {
        u.email.clone()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
