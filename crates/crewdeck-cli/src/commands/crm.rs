use anyhow::Result;
use clap::{Subcommand, ValueEnum};
use crewdeck_application::CrewdeckApp;
use crewdeck_core::crm::{
    ContactInput, ContactSearch, CrmFailure, CrmObject, ObjectKind, ObjectPage, PageRequest,
    PipelineObject,
};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;

use super::utils::print_json;

#[derive(Clone, Copy, ValueEnum)]
pub enum PipelineKind {
    Deals,
    Tickets,
}

impl From<PipelineKind> for PipelineObject {
    fn from(kind: PipelineKind) -> Self {
        match kind {
            PipelineKind::Deals => PipelineObject::Deals,
            PipelineKind::Tickets => PipelineObject::Tickets,
        }
    }
}

#[derive(Subcommand)]
pub enum CrmAction {
    /// Check the token against account details and contacts access
    Test,
    /// List contacts
    Contacts {
        #[arg(long, default_value_t = 10)]
        limit: u32,
        #[arg(long)]
        after: Option<String>,
        /// Free-text query
        #[arg(long)]
        query: Option<String>,
    },
    /// List deals
    Deals {
        #[arg(long, default_value_t = 10)]
        limit: u32,
        #[arg(long)]
        after: Option<String>,
        /// Comma-separated property names
        #[arg(long, value_delimiter = ',')]
        properties: Vec<String>,
    },
    /// List records of a custom object type (e.g. 2-47887496)
    Objects {
        object_type: String,
        #[arg(long, default_value_t = 10)]
        limit: u32,
        #[arg(long)]
        after: Option<String>,
        #[arg(long, value_delimiter = ',')]
        properties: Vec<String>,
    },
    /// Search contacts whose email contains a token
    Search {
        email: String,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Create or update a contact keyed by email
    Upsert {
        email: String,
        #[arg(long)]
        firstname: Option<String>,
        #[arg(long)]
        lastname: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        company: Option<String>,
    },
    /// List object schemas, split into standard and custom
    Schemas,
    /// List pipelines and their stages
    Pipelines {
        #[arg(value_enum, default_value = "deals")]
        object: PipelineKind,
    },
}

/// Prints a CRM result. Failures become `{success: false, ...}` in JSON mode.
fn report<T: Serialize>(
    result: Result<T, CrmFailure>,
    json: bool,
    human: impl FnOnce(&T),
) -> Result<()> {
    match result {
        Ok(value) if json => print_json(&json!({ "success": true, "data": value })),
        Ok(value) => {
            human(&value);
            Ok(())
        }
        Err(failure) if json => {
            print_json(&failure)?;
            Err(failure.into())
        }
        Err(failure) => Err(failure.into()),
    }
}

fn print_objects(page: &ObjectPage, columns: &[&str]) {
    for object in &page.results {
        print_object(object, columns);
    }
    match (page.total, page.next_after()) {
        (Some(total), Some(after)) => println!("{} total, next page: --after {}", total, after),
        (Some(total), None) => println!("{} total", total),
        (None, Some(after)) => println!("next page: --after {}", after),
        (None, None) => {}
    }
}

fn print_object(object: &CrmObject, columns: &[&str]) {
    let values: Vec<&str> = columns
        .iter()
        .map(|c| object.property(c).unwrap_or("-"))
        .collect();
    println!("{:<14} {}", object.id, values.join("  "));
}

fn page(limit: u32, after: Option<String>, properties: Vec<String>, query: Option<String>) -> PageRequest {
    PageRequest {
        limit,
        after,
        properties,
        query,
    }
}

pub async fn run(app: &CrewdeckApp, action: CrmAction, json: bool) -> Result<()> {
    let crm = &app.crm;
    match action {
        CrmAction::Test => {
            report(crm.test_connection().await, json, |conn| {
                println!("Connected to CRM");
                if let Some(portal) = conn.account.portal_id {
                    println!("  portal:   {}", portal);
                }
                if let Some(kind) = &conn.account.account_type {
                    println!("  account:  {}", kind);
                }
                if let Some(zone) = &conn.account.time_zone {
                    println!("  timezone: {}", zone);
                }
                if let Some(total) = conn.contacts_total {
                    println!("  contacts: {}", total);
                }
            })
        }
        CrmAction::Contacts { limit, after, query } => {
            let request = page(limit, after, Vec::new(), query);
            report(
                crm.list_objects(&ObjectKind::Contacts, &request).await,
                json,
                |page| print_objects(page, &["email", "firstname", "lastname"]),
            )
        }
        CrmAction::Deals {
            limit,
            after,
            properties,
        } => {
            let request = page(limit, after, properties, None);
            report(
                crm.list_objects(&ObjectKind::Deals, &request).await,
                json,
                |page| print_objects(page, &["dealname", "amount", "dealstage"]),
            )
        }
        CrmAction::Objects {
            object_type,
            limit,
            after,
            properties,
        } => {
            let columns: Vec<String> = properties.clone();
            let request = page(limit, after, properties, None);
            let kind = ObjectKind::from(object_type.as_str());
            report(crm.list_objects(&kind, &request).await, json, |page| {
                let columns: Vec<&str> = columns.iter().map(String::as_str).collect();
                print_objects(page, &columns)
            })
        }
        CrmAction::Search { email, limit } => {
            let mut search = ContactSearch::email_token(email);
            search.limit = limit;
            report(crm.search_contacts(&search).await, json, |page| {
                print_objects(page, &["email", "firstname", "lastname", "createdate"])
            })
        }
        CrmAction::Upsert {
            email,
            firstname,
            lastname,
            phone,
            company,
        } => {
            let input = ContactInput {
                email,
                firstname,
                lastname,
                phone,
                company,
                properties: BTreeMap::new(),
            };
            report(crm.upsert_contact(&input).await, json, |contact| {
                println!("Contact {}", contact.id);
            })
        }
        CrmAction::Schemas => report(crm.list_schemas().await, json, |catalog| {
            println!("{} schemas", catalog.total_schemas);
            for object in &catalog.standard_objects {
                println!("  standard {:<16} {}", object.id, object.name);
            }
            for object in &catalog.custom_objects {
                println!(
                    "  custom   {:<16} {} ({} properties)",
                    object.id, object.name, object.property_count
                );
            }
        }),
        CrmAction::Pipelines { object } => {
            report(crm.list_pipelines(object.into()).await, json, |pipelines| {
                for pipeline in pipelines {
                    println!("{} ({})", pipeline.label, pipeline.id);
                    for stage in &pipeline.stages {
                        println!("  {:>3} {} ({})", stage.display_order, stage.label, stage.id);
                    }
                }
            })
        }
    }
}
