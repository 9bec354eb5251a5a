use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::Date;

use crate::context::ClientContext;
use crate::descriptor::Operation;
use crate::entities::contact::Contact;
use crate::error::Result;
use crate::resource::{Entity, EntityRequest};
use crate::utils::date_format::{fiken_date, fiken_date_option};
use crate::{contextual, resource};

/// A project. Created through [`ProjectRequest`]; updates only send the mutable fields.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    #[serde(skip_serializing_if = "Option::is_none")]
    project_id: Option<i64>,
    pub number: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(with = "fiken_date_option")]
    pub start_date: Option<Date>,
    #[serde(with = "fiken_date_option")]
    pub end_date: Option<Date>,
    pub contact: Option<Contact>,
    pub completed: Option<bool>,
    #[serde(skip)]
    context: ClientContext,
}

impl Project {
    #[must_use]
    pub fn project_id(&self) -> Option<i64> {
        self.project_id
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectUpdate<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(with = "fiken_date_option", skip_serializing_if = "Option::is_none")]
    start_date: Option<Date>,
    #[serde(with = "fiken_date_option", skip_serializing_if = "Option::is_none")]
    end_date: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed: Option<bool>,
}

resource! {
    Project as "Project",
    templates: {
        Operation::GetOne => "/companies/{companySlug}/projects/{projectId}",
        Operation::GetMany => "/companies/{companySlug}/projects",
        Operation::Patch => "/companies/{companySlug}/projects/{projectId}",
        Operation::Delete => "/companies/{companySlug}/projects/{projectId}",
    },
    fields: { "projectId" => project_id },
}

contextual!(Project);

impl Entity for Project {
    const ID_FIELD: &'static str = "projectId";

    fn patch_body(&self) -> Result<Value> {
        Ok(serde_json::to_value(ProjectUpdate {
            name: self.name.as_deref(),
            description: self.description.as_deref(),
            start_date: self.start_date,
            end_date: self.end_date,
            completed: self.completed,
        })?)
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRequest {
    pub number: String,
    pub name: String,
    #[serde(with = "fiken_date")]
    pub start_date: Date,
    #[serde(with = "fiken_date_option", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

resource! {
    ProjectRequest as "ProjectRequest",
    templates: {
        Operation::Create => "/companies/{companySlug}/projects",
    },
    fields: {},
}

impl EntityRequest for ProjectRequest {
    type Target = Project;
}
