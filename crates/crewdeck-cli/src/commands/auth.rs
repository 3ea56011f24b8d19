use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand, ValueEnum};
use crewdeck_application::CrewdeckApp;
use crewdeck_application::seed::demo_user;
use crewdeck_core::user::{
    IdentityService, LoginCredentials, ServiceType, SignupData, User, UserRole, UserUpdate,
};

use super::utils::{local_time, print_json};

#[derive(Clone, Copy, ValueEnum)]
pub enum DemoRole {
    Photographer,
    Videographer,
    Client,
    Assistant,
    Director,
}

impl From<DemoRole> for UserRole {
    fn from(role: DemoRole) -> Self {
        match role {
            DemoRole::Photographer => UserRole::Photographer,
            DemoRole::Videographer => UserRole::Videographer,
            DemoRole::Client => UserRole::Client,
            DemoRole::Assistant => UserRole::Assistant,
            DemoRole::Director => UserRole::Director,
        }
    }
}

#[derive(Args)]
pub struct SignupArgs {
    email: String,
    password: String,
    /// Display name
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "photographer")]
    role: UserRole,
    #[arg(long, default_value = "photography")]
    service_type: ServiceType,
    #[arg(long)]
    company: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    /// Link an existing CRM contact instead of creating one
    #[arg(long)]
    crm_contact_id: Option<String>,
}

#[derive(Subcommand)]
pub enum AccountAction {
    /// List stored accounts
    List,
    /// Update profile fields of an account
    Update {
        user_id: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        role: Option<UserRole>,
        #[arg(long)]
        service_type: Option<ServiceType>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        crm_contact_id: Option<String>,
    },
    /// Refresh an account from its CRM contact (defaults to the signed-in user)
    Sync { user_id: Option<String> },
    /// Delete every stored account
    Clear,
}

fn print_user(user: &User, json: bool) -> Result<()> {
    if json {
        return print_json(user);
    }
    println!("{} <{}>", user.name, user.email);
    println!("  id:       {}", user.id);
    println!("  role:     {} ({})", user.role, user.service_type);
    if let Some(company) = &user.company {
        println!("  company:  {}", company);
    }
    if let Some(contact) = &user.crm_contact_id {
        println!("  crm:      contact {} ({} deals)", contact, user.crm_deal_ids.len());
    }
    println!("  seen:     {}", local_time(&user.last_seen));
    Ok(())
}

pub async fn login(app: &CrewdeckApp, email: String, password: String, json: bool) -> Result<()> {
    let user = app
        .session
        .login(LoginCredentials { email, password })
        .await?;
    print_user(&user, json)
}

pub async fn demo(app: &CrewdeckApp, role: DemoRole, json: bool) -> Result<()> {
    let user = demo_user(role.into(), app.events.now());
    let user = app.session.quick_login(user).await?;
    print_user(&user, json)
}

pub async fn signup(app: &CrewdeckApp, args: SignupArgs, json: bool) -> Result<()> {
    let data = SignupData {
        email: args.email,
        password: args.password,
        name: args.name,
        role: args.role,
        service_type: args.service_type,
        company: args.company,
        phone: args.phone,
        crm_contact_id: args.crm_contact_id,
    };
    let user = app.session.signup(data).await?;
    if user.crm_contact_id.is_none() && app.crm_configured && !json {
        println!("(CRM contact could not be created; account is not linked)");
    }
    print_user(&user, json)
}

pub async fn logout(app: &CrewdeckApp) -> Result<()> {
    app.session.logout().await?;
    println!("Signed out");
    Ok(())
}

pub fn whoami(app: &CrewdeckApp, json: bool) -> Result<()> {
    match app.session.user() {
        Some(user) => print_user(&user, json),
        None if json => print_json(&serde_json::Value::Null),
        None => {
            println!("Not signed in");
            Ok(())
        }
    }
}

pub async fn account(app: &CrewdeckApp, action: AccountAction, json: bool) -> Result<()> {
    match action {
        AccountAction::List => {
            let users = app.accounts.list_users().await?;
            if json {
                return print_json(&users);
            }
            if users.is_empty() {
                println!("No accounts");
            }
            for user in users {
                println!("{:<38} {:<28} {:<14} {}", user.id, user.email, user.role, user.name);
            }
        }
        AccountAction::Update {
            user_id,
            email,
            name,
            role,
            service_type,
            company,
            phone,
            crm_contact_id,
        } => {
            let update = UserUpdate {
                email,
                name,
                role,
                service_type,
                company,
                phone,
                crm_contact_id,
            };
            let user = app.accounts.update_user(&user_id, update).await?;
            print_user(&user, json)?;
        }
        AccountAction::Sync { user_id } => {
            let user_id = match user_id {
                Some(id) => id,
                None => app
                    .session
                    .user()
                    .map(|u| u.id)
                    .context("not signed in; pass a user id")?,
            };
            let outcome = app.accounts.sync_with_crm(&user_id).await?;
            if json {
                return print_json(&serde_json::json!({
                    "user": outcome.user,
                    "crmData": outcome.contact_properties,
                    "dealCount": outcome.deal_count,
                }));
            }
            println!("Synced with CRM: {} deals", outcome.deal_count);
            print_user(&outcome.user, false)?;
        }
        AccountAction::Clear => {
            if app.session.is_authenticated() {
                bail!("sign out before clearing accounts");
            }
            app.accounts.clear_users().await?;
            println!("All accounts cleared");
        }
    }
    Ok(())
}
