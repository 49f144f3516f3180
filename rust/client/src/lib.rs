extern crate reqwest;
extern crate serde;
extern crate serde_json;

mod error;

pub use error::{Error, Result};

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::ser::Serialize;
use serde_json::{to_value, Map, Value};
use std::collections::HashMap;
use tracing::debug;
use value_extensions::*;

pub type Discrete = i32;
pub type Continous = f64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObsActSpaceItem {
    Discrete(Discrete),
    Continous(Continous),
}

impl ObsActSpaceItem {
    pub fn discrete_value(&self) -> Option<Discrete> {
        if let Self::Discrete(n) = self {
            Some(*n)
        } else {
            None
        }
    }

    pub fn box_value(&self) -> Option<Continous> {
        if let Self::Continous(n) = self {
            Some(*n)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObsActSpace {
    /// Refer: https://www.gymlibrary.dev/api/spaces/#discrete
    Discrete { n: Discrete },

    /// Refer: https://www.gymlibrary.dev/api/spaces/#box
    Box {
        shape: Vec<Discrete>,
        high: Vec<Continous>,
        low: Vec<Continous>,
    },
}

impl ObsActSpace {
    pub fn from_json(info: &Map<String, Value>) -> Result<Self> {
        let name = info
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Malformed("space info has no 'name'".into()))?;

        match name {
            "Discrete" => Ok(ObsActSpace::Discrete {
                n: as_discrete(field(info, "n"), "n")?,
            }),
            "Box" => Ok(ObsActSpace::Box {
                shape: as_discrete_item_vec(field(info, "shape"), "shape")?,
                high: as_continous_item_vec(field(info, "high"), "high")?,
                low: as_continous_item_vec(field(info, "low"), "low")?,
            }),
            e => Err(Error::UnsupportedSpace(e.to_string())),
        }
    }

    /// Number of elements for `Discrete` spaces, `None` otherwise.
    pub fn n(&self) -> Option<Discrete> {
        match self {
            ObsActSpace::Discrete { n } => Some(*n),
            _ => None,
        }
    }

    pub fn items_from_json(&self, vals: &[Value]) -> Result<Vec<ObsActSpaceItem>> {
        match self {
            ObsActSpace::Discrete { .. } => vals
                .iter()
                .map(|v| as_discrete(v, "observation").map(ObsActSpaceItem::Discrete))
                .collect(),

            ObsActSpace::Box { .. } => vals
                .iter()
                .map(|v| {
                    v.as_f64()
                        .map(ObsActSpaceItem::Continous)
                        .ok_or_else(|| Error::Malformed("observation".into()))
                })
                .collect(),
        }
    }
}

#[derive(Debug)]
pub struct StepInfo {
    pub observation: Vec<ObsActSpaceItem>,
    pub reward: Continous,
    pub truncated: bool,
    pub terminated: bool,
    pub info: Value,
}

/// Create a gymnasium environment or get reference to an existing one.
/// NOTE: All APIs are sync as the server is expected to be local.
#[derive(Debug)]
pub struct Environment {
    client: Client,
    api_url: String,
    instance_id: String,
    obs_space: ObsActSpace,
    act_space: ObsActSpace,
}

impl Environment {
    pub fn new(
        api_url: &str,
        env_name: &str,
        max_episode_steps: Option<Discrete>,
        auto_reset: Option<bool>,
        disable_env_checker: Option<bool>,
        kwargs: &[(&str, Value)],
    ) -> Result<Self> {
        let mut body = HashMap::<&str, Value>::from([("env_id", Value::from(env_name))]);

        if let Some(max_episode_steps) = max_episode_steps {
            body.insert("max_episode_steps", Value::from(max_episode_steps));
        }

        if let Some(auto_reset) = auto_reset {
            body.insert("auto_reset", Value::from(auto_reset));
        }

        if let Some(disable_env_checker) = disable_env_checker {
            body.insert("disable_env_checker", Value::from(disable_env_checker));
        }

        let kwargs = kwargs.iter().cloned().collect::<HashMap<&str, Value>>();
        body.insert("kwargs", to_value(kwargs)?);

        let c = Client::new(api_url);
        let obj = c.http_post(&c.make_api_url(""), &body)?;
        let inst_id = as_str(&obj["instance_id"], "instance_id")?;

        Self::reference(api_url, inst_id)
    }

    pub fn reference(api_url: &str, instance_id: &str) -> Result<Self> {
        let client = Client::new(api_url);

        let url = client.make_api_url(&format!("{instance_id}/observation_space/"));
        let obs_space = ObsActSpace::from_json(as_object(&client.http_get(&url)?["info"], "info")?)?;

        let url = client.make_api_url(&format!("{instance_id}/action_space/"));
        let act_space = ObsActSpace::from_json(as_object(&client.http_get(&url)?["info"], "info")?)?;

        let api_url = client.make_api_url(&format!("{instance_id}/"));
        debug!(%instance_id, ?obs_space, ?act_space, "attached to environment");

        Ok(Self {
            client,
            api_url,
            instance_id: instance_id.to_string(),
            obs_space,
            act_space,
        })
    }

    pub fn client_base_url(&self) -> &str {
        self.client.base_url()
    }

    pub fn name(&self) -> Result<String> {
        let obj = self.client.http_get(&self.api_url)?;

        as_str(&obj["id"], "id").map(str::to_string)
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// The Space object corresponding to valid actions, all valid actions should be contained with the space.
    /// For example, if the action space is of type Discrete and gives the value Discrete(2), this means there
    /// are two valid discrete actions: 0 & 1.
    /// Refer: https://gymnasium.farama.org/api/env/#gymnasium.Env.action_space
    pub fn action_space(&self) -> &ObsActSpace {
        &self.act_space
    }

    /// The Space object corresponding to valid observations, all valid observations should be contained with
    /// the space.
    /// Refer: https://gymnasium.farama.org/api/env/#gymnasium.Env.observation_space
    pub fn observation_space(&self) -> &ObsActSpace {
        &self.obs_space
    }

    pub fn reset(&self, seed: Option<usize>) -> Result<Vec<ObsActSpaceItem>> {
        let mut body = HashMap::new();
        if let Some(seed) = seed {
            let _ = body.insert("seed", seed.to_string());
        }

        let obj = self.client.http_post(&self.make_api_url("reset/"), &body)?;
        self.obs_space
            .items_from_json(as_array(&obj["observation"], "observation")?)
    }

    pub fn step(&self, action: Discrete) -> Result<StepInfo> {
        match self.act_space {
            ObsActSpace::Discrete { n } if (0..n).contains(&action) => {}
            ObsActSpace::Discrete { n } => {
                return Err(Error::InvalidAction(format!(
                    "{action} is outside of Discrete({n})"
                )))
            }
            ObsActSpace::Box { .. } => {
                return Err(Error::InvalidAction(
                    "Box action spaces take continous actions".into(),
                ))
            }
        }

        let req = HashMap::from([("action", Value::from(action))]);
        let obj = self.client.http_post(&self.make_api_url("step/"), &req)?;
        let observation = self
            .obs_space
            .items_from_json(as_array(&obj["observation"], "observation")?)?;

        Ok(StepInfo {
            observation,
            reward: as_continous(&obj["reward"], "reward")?,
            truncated: as_bool(&obj["truncated"], "truncated")?,
            terminated: as_bool(&obj["terminated"], "terminated")?,
            info: obj["info"].clone(),
        })
    }

    pub fn close(&self) -> Result<()> {
        let body = HashMap::<&str, Value>::new();
        self.client.http_post(&self.make_api_url("close/"), &body)?;

        Ok(())
    }

    fn make_api_url(&self, path: &str) -> String {
        format!("{}{path}", self.api_url)
    }
}

#[derive(Debug)]
pub struct Client {
    base_url: String,
    api_url: String,
    client: reqwest::blocking::Client,
}

impl Client {
    pub fn new(base_url: &str) -> Self {
        let mut base_url = base_url.replace("//localhost:", "//127.0.0.1:");
        if base_url.ends_with('/') {
            _ = base_url.remove(base_url.len() - 1);
        }

        let api_url = format!("{base_url}/v1/envs/");

        Self {
            base_url,
            api_url,
            client: reqwest::blocking::Client::new(),
        }
    }

    pub fn make_api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn http_get(&self, url: &str) -> Result<Value> {
        debug!(%url, "GET");
        let res = self
            .client
            .get(url)
            .headers(Self::construct_common_headers())
            .send()?;

        Ok(res.error_for_status()?.json::<Value>()?)
    }

    fn http_post<T: Serialize>(&self, url: &str, body: &HashMap<&str, T>) -> Result<Value> {
        debug!(%url, "POST");
        let res = self
            .client
            .post(url)
            .headers(Self::construct_common_headers())
            .json(body)
            .send()?;

        Ok(res.error_for_status()?.json::<Value>()?)
    }

    fn construct_common_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }
}

mod value_extensions {
    use super::*;

    pub fn field<'a>(info: &'a Map<String, Value>, key: &str) -> &'a Value {
        info.get(key).unwrap_or(&Value::Null)
    }

    fn malformed(what: &str) -> Error {
        Error::Malformed(format!("missing or invalid '{what}'"))
    }

    pub fn as_str<'a>(val: &'a Value, what: &str) -> Result<&'a str> {
        val.as_str().ok_or_else(|| malformed(what))
    }

    pub fn as_bool(val: &Value, what: &str) -> Result<bool> {
        val.as_bool().ok_or_else(|| malformed(what))
    }

    pub fn as_array<'a>(val: &'a Value, what: &str) -> Result<&'a Vec<Value>> {
        val.as_array().ok_or_else(|| malformed(what))
    }

    pub fn as_object<'a>(val: &'a Value, what: &str) -> Result<&'a Map<String, Value>> {
        val.as_object().ok_or_else(|| malformed(what))
    }

    pub fn as_discrete(val: &Value, what: &str) -> Result<Discrete> {
        val.as_i64()
            .and_then(|x| Discrete::try_from(x).ok())
            .ok_or_else(|| malformed(what))
    }

    pub fn as_continous(val: &Value, what: &str) -> Result<Continous> {
        val.as_f64().ok_or_else(|| malformed(what))
    }

    pub fn as_discrete_item_vec(val: &Value, what: &str) -> Result<Vec<Discrete>> {
        as_array(val, what)?
            .iter()
            .map(|x| as_discrete(x, what))
            .collect()
    }

    pub fn as_continous_item_vec(val: &Value, what: &str) -> Result<Vec<Continous>> {
        as_array(val, what)?
            .iter()
            .map(|x| as_continous(x, what))
            .collect()
    }
}
