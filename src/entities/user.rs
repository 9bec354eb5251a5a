use serde::{Deserialize, Serialize};

use crate::descriptor::Operation;
use crate::resource;

/// The user a credential belongs to, see [`Client::user`](crate::Client::user).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserInfo {
    pub name: String,
    pub email: String,
}

resource! {
    UserInfo as "UserInfo",
    templates: {
        Operation::GetOne => "/user",
    },
    fields: {},
}
