//! Back-office user commands.

use backoffice::controller::USER_FILTERS;
use backoffice::forms::UserForm;
use backoffice::models::{UserAccount, UserState};
use backoffice::{Backoffice, BackofficeError, PaginationEnvelope};
use clap::Subcommand;
use serde::Serialize;

use super::{emit, invalid, load_list, require_admin, set_if, Deleted, ListArgs};

const USERS_ROUTE: &str = "/admin/users";

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List users (status: active, inactive or all)
    List(ListArgs),
    /// Show one user
    Get { id: String },
    /// Edit a user's profile; omitted fields keep their value
    Update {
        id: String,
        #[arg(long = "first-name")]
        first_name: Option<String>,
        #[arg(long = "last-name")]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// admin, editor or viewer
        #[arg(long)]
        role: Option<String>,
    },
    /// Re-enable a deactivated account
    Activate { id: String },
    /// Deactivate an account
    Deactivate { id: String },
    /// Send a password reset to the user
    ResetPassword { id: String },
    /// Delete a user
    Delete { id: String },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordReset {
    id: String,
    reset_sent: bool,
}

pub async fn run(app: &Backoffice, command: UsersCommand) -> bool {
    match command {
        UsersCommand::List(args) => emit(list(app, &args).await),
        UsersCommand::Get { id } => emit(get(app, &id).await),
        UsersCommand::Update {
            id,
            first_name,
            last_name,
            email,
            role,
        } => {
            let mut changes = UserForm::default();
            set_if(&mut changes.first_name, &first_name);
            set_if(&mut changes.last_name, &last_name);
            set_if(&mut changes.email, &email);
            set_if(&mut changes.role, &role);
            emit(update(app, &id, changes).await)
        }
        UsersCommand::Activate { id } => emit(set_active(app, &id, true).await),
        UsersCommand::Deactivate { id } => emit(set_active(app, &id, false).await),
        UsersCommand::ResetPassword { id } => emit(reset_password(app, &id).await),
        UsersCommand::Delete { id } => emit(delete(app, &id).await),
    }
}

async fn list(
    app: &Backoffice,
    args: &ListArgs,
) -> Result<PaginationEnvelope<UserAccount>, BackofficeError> {
    require_admin(app, USERS_ROUTE)?;
    let users = app.resources().users.clone();
    load_list::<_, UserState, _, _>(app, USER_FILTERS, args, |params| async move {
        users.list(&params).await
    })
    .await
}

async fn get(app: &Backoffice, id: &str) -> Result<UserAccount, BackofficeError> {
    require_admin(app, USERS_ROUTE)?;
    Ok(app.resources().users.get(id).await?)
}

/// Blank fields in `changes` keep the stored value.
async fn update(
    app: &Backoffice,
    id: &str,
    changes: UserForm,
) -> Result<UserAccount, BackofficeError> {
    require_admin(app, USERS_ROUTE)?;
    let current = app.resources().users.get(id).await?;
    let mut form = UserForm::from_user(&current);
    for (target, value) in [
        (&mut form.first_name, changes.first_name),
        (&mut form.last_name, changes.last_name),
        (&mut form.email, changes.email),
        (&mut form.role, changes.role),
    ] {
        if !value.is_empty() {
            *target = value;
        }
    }
    let update = form.validate()?;
    Ok(app.resources().users.update(id, &update).await?)
}

async fn set_active(
    app: &Backoffice,
    id: &str,
    is_active: bool,
) -> Result<UserAccount, BackofficeError> {
    require_admin(app, USERS_ROUTE)?;
    if !is_active && app.session().user().is_some_and(|me| me.id == id) {
        return Err(invalid("id", "You cannot deactivate your own account."));
    }
    let user = app.resources().users.get(id).await?;
    Ok(app.resources().users.set_active(&user, is_active).await?)
}

async fn reset_password(app: &Backoffice, id: &str) -> Result<PasswordReset, BackofficeError> {
    require_admin(app, USERS_ROUTE)?;
    app.resources().users.reset_password(id).await?;
    Ok(PasswordReset {
        id: id.to_string(),
        reset_sent: true,
    })
}

async fn delete(app: &Backoffice, id: &str) -> Result<Deleted, BackofficeError> {
    require_admin(app, USERS_ROUTE)?;
    if app.session().user().is_some_and(|me| me.id == id) {
        return Err(invalid("id", "You cannot delete your own account."));
    }
    app.resources().users.delete(id).await?;
    Ok(Deleted::new(id))
}
