//! Sign-in, sign-out and current-user commands.

use backoffice::forms::LoginForm;
use backoffice::models::UserAccount;
use backoffice::{resolve_secret, Backoffice, BackofficeError};
use clap::Args;
use serde::Serialize;

use super::emit;

/// Password sources, tried in this order: flag, file, environment variable.
#[derive(Debug, Clone, Args)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,

    #[arg(long, conflicts_with = "password_file")]
    pub password: Option<String>,

    #[arg(long = "password-file", value_name = "PATH")]
    pub password_file: Option<String>,

    #[arg(long = "password-env", value_name = "VAR", default_value = "BACKOFFICE_PASSWORD")]
    pub password_env: String,

    /// Page that sent the user to sign in
    #[arg(long = "from", value_name = "PATH")]
    pub from: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignedIn {
    user: UserAccount,
    redirect: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignedOut {
    signed_out: bool,
}

pub async fn login(app: &mut Backoffice, args: LoginArgs) -> bool {
    emit(sign_in(app, args).await)
}

pub async fn logout(app: &mut Backoffice) -> bool {
    let result = app
        .session_mut()
        .logout()
        .await
        .map(|_| SignedOut { signed_out: true })
        .map_err(BackofficeError::from);
    emit(result)
}

pub async fn whoami(app: &mut Backoffice) -> bool {
    let result = match app.session_mut().refresh().await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(super::invalid(
            "session",
            "Not signed in. Run `backoffice login` first.",
        )),
        Err(e) => Err(e.into()),
    };
    emit(result)
}

async fn sign_in(app: &mut Backoffice, args: LoginArgs) -> Result<SignedIn, BackofficeError> {
    let password = resolve_secret(
        args.password.as_deref(),
        args.password_file.as_deref(),
        Some(args.password_env.as_str()),
    )?;
    let form = LoginForm {
        email: args.email,
        password,
    };
    let user = app.session_mut().login(&form).await?;
    let redirect = app.gate().post_login_redirect(args.from.as_deref());
    log::info!("Signed in; continuing to {}", redirect);
    Ok(SignedIn { user, redirect })
}
