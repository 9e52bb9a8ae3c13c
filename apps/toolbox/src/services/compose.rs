//! Docker Compose project model and YAML generation.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use thiserror::Error;

pub const FILE_NAME: &str = "docker-compose.yml";

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("{} validation problem(s) found", .0.len())]
    Invalid(Vec<ValidationIssue>),
    #[error("yaml serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("no service at position {0}")]
    UnknownService(usize),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationIssue {
    pub service: usize,
    pub message: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RestartPolicy {
    #[default]
    No,
    Always,
    OnFailure,
    UnlessStopped,
}

impl RestartPolicy {
    pub const ALL: [RestartPolicy; 4] = [
        Self::No,
        Self::Always,
        Self::OnFailure,
        Self::UnlessStopped,
    ];

    pub fn value(self) -> &'static str {
        match self {
            Self::No => "no",
            Self::Always => "always",
            Self::OnFailure => "on-failure",
            Self::UnlessStopped => "unless-stopped",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|policy| policy.value() == value)
    }
}

/// One service as edited in the form. List fields hold one entry per
/// line (`KEY=value` for environment).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    pub image: String,
    pub container_name: String,
    pub command: String,
    pub ports: Vec<String>,
    pub environment: Vec<String>,
    pub volumes: Vec<String>,
    pub depends_on: Vec<String>,
    pub networks: Vec<String>,
    pub restart: RestartPolicy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preset {
    Nginx,
    Postgres,
    Redis,
    Mysql,
    Node,
}

impl Preset {
    pub const ALL: [Preset; 5] = [
        Self::Nginx,
        Self::Postgres,
        Self::Redis,
        Self::Mysql,
        Self::Node,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Nginx => "Nginx",
            Self::Postgres => "PostgreSQL",
            Self::Redis => "Redis",
            Self::Mysql => "MySQL",
            Self::Node => "Node.js",
        }
    }

    pub fn service(self) -> Service {
        let list = |items: &[&str]| -> Vec<String> {
            items.iter().map(|item| item.to_string()).collect()
        };
        match self {
            Self::Nginx => Service {
                name: "web".into(),
                image: "nginx:latest".into(),
                ports: list(&["80:80"]),
                volumes: list(&["./html:/usr/share/nginx/html:ro"]),
                restart: RestartPolicy::UnlessStopped,
                ..Service::default()
            },
            Self::Postgres => Service {
                name: "db".into(),
                image: "postgres:16".into(),
                ports: list(&["5432:5432"]),
                environment: list(&[
                    "POSTGRES_USER=app",
                    "POSTGRES_PASSWORD=change-me",
                    "POSTGRES_DB=app",
                ]),
                volumes: list(&["pgdata:/var/lib/postgresql/data"]),
                restart: RestartPolicy::UnlessStopped,
                ..Service::default()
            },
            Self::Redis => Service {
                name: "cache".into(),
                image: "redis:7-alpine".into(),
                ports: list(&["6379:6379"]),
                volumes: list(&["redisdata:/data"]),
                restart: RestartPolicy::UnlessStopped,
                ..Service::default()
            },
            Self::Mysql => Service {
                name: "mysql".into(),
                image: "mysql:8".into(),
                ports: list(&["3306:3306"]),
                environment: list(&["MYSQL_ROOT_PASSWORD=change-me", "MYSQL_DATABASE=app"]),
                volumes: list(&["mysqldata:/var/lib/mysql"]),
                restart: RestartPolicy::UnlessStopped,
                ..Service::default()
            },
            Self::Node => Service {
                name: "app".into(),
                image: "node:20-alpine".into(),
                command: "npm start".into(),
                ports: list(&["3000:3000"]),
                environment: list(&["NODE_ENV=production"]),
                volumes: list(&["./:/usr/src/app"]),
                ..Service::default()
            },
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComposeProject {
    pub services: Vec<Service>,
}

impl ComposeProject {
    pub fn add(&mut self, service: Service) -> usize {
        self.services.push(service);
        self.services.len() - 1
    }

    /// Adds a preset, suffixing its name until it is unique.
    pub fn add_preset(&mut self, preset: Preset) -> usize {
        let mut service = preset.service();
        let base = service.name.clone();
        let mut suffix = 2;
        while self.services.iter().any(|existing| existing.name == service.name) {
            service.name = format!("{base}{suffix}");
            suffix += 1;
        }
        self.add(service)
    }

    /// Removes the service and any `depends_on` entries that named it.
    pub fn remove(&mut self, index: usize) -> Result<Service, ComposeError> {
        if index >= self.services.len() {
            return Err(ComposeError::UnknownService(index));
        }
        let removed = self.services.remove(index);
        for service in &mut self.services {
            service.depends_on.retain(|name| name != &removed.name);
        }
        Ok(removed)
    }

    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        let mut seen = HashSet::new();
        let names: HashSet<&str> = self
            .services
            .iter()
            .map(|service| service.name.trim())
            .collect();
        let mut report = |service: usize, message: String| {
            issues.push(ValidationIssue { service, message })
        };

        for (index, service) in self.services.iter().enumerate() {
            let name = service.name.trim();
            if name.is_empty() {
                report(index, "service name is required".into());
            } else if !seen.insert(name) {
                report(index, format!("service name `{name}` is used more than once"));
            }
            if service.image.trim().is_empty() {
                report(index, "image is required".into());
            }
            for port in non_blank(&service.ports) {
                if !is_valid_port_mapping(port) {
                    report(
                        index,
                        format!("port `{port}` must look like [host:]container[/tcp|udp]"),
                    );
                }
            }
            for dependency in non_blank(&service.depends_on) {
                if dependency == name {
                    report(index, "a service cannot depend on itself".into());
                } else if !names.contains(dependency) {
                    report(index, format!("depends on unknown service `{dependency}`"));
                }
            }
            for variable in non_blank(&service.environment) {
                if variable.split('=').next().map_or(true, |key| key.trim().is_empty()) {
                    report(index, format!("environment entry `{variable}` needs a name"));
                }
            }
        }
        issues
    }

    /// Named volumes referenced by any service, e.g. `pgdata` from
    /// `pgdata:/var/lib/postgresql/data`.
    pub fn named_volumes(&self) -> Vec<String> {
        let mut volumes: Vec<String> = self
            .services
            .iter()
            .flat_map(|service| non_blank(&service.volumes))
            .filter_map(|volume| {
                let (source, _) = volume.split_once(':')?;
                let is_path = source.starts_with(['.', '/', '~', '$']);
                (!source.is_empty() && !is_path).then(|| source.to_string())
            })
            .collect();
        volumes.sort();
        volumes.dedup();
        volumes
    }

    pub fn networks(&self) -> Vec<String> {
        let mut networks: Vec<String> = self
            .services
            .iter()
            .flat_map(|service| non_blank(&service.networks))
            .map(str::to_string)
            .collect();
        networks.sort();
        networks.dedup();
        networks
    }

    pub fn to_yaml(&self) -> Result<String, ComposeError> {
        let issues = self.validate();
        if !issues.is_empty() {
            return Err(ComposeError::Invalid(issues));
        }
        let file = ComposeFile {
            services: self
                .services
                .iter()
                .map(|service| (service.name.trim().to_string(), ServiceYaml::from(service)))
                .collect(),
            volumes: self
                .named_volumes()
                .into_iter()
                .map(|name| (name, BTreeMap::new()))
                .collect(),
            networks: self
                .networks()
                .into_iter()
                .map(|name| (name, BTreeMap::new()))
                .collect(),
        };
        Ok(serde_yaml::to_string(&file)?)
    }
}

fn non_blank(values: &[String]) -> impl Iterator<Item = &str> {
    values
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn is_valid_port(value: &str) -> bool {
    !value.is_empty()
        && value.bytes().all(|byte| byte.is_ascii_digit())
        && value.parse::<u16>().is_ok_and(|port| port > 0)
}

/// `[host:]container[/tcp|udp]`
pub fn is_valid_port_mapping(value: &str) -> bool {
    let (ports, protocol) = match value.split_once('/') {
        Some((ports, protocol)) => (ports, Some(protocol)),
        None => (value, None),
    };
    if protocol.is_some_and(|protocol| !matches!(protocol, "tcp" | "udp")) {
        return false;
    }
    match ports.split_once(':') {
        Some((host, container)) => is_valid_port(host) && is_valid_port(container),
        None => is_valid_port(ports),
    }
}

type EmptyMapping = BTreeMap<String, String>;

#[serde_as]
#[derive(Serialize)]
struct ComposeFile {
    #[serde_as(as = "serde_with::Map<_, _>")]
    services: Vec<(String, ServiceYaml)>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    volumes: BTreeMap<String, EmptyMapping>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    networks: BTreeMap<String, EmptyMapping>,
}

#[derive(Serialize)]
struct ServiceYaml {
    image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    container_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    command: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ports: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    environment: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    volumes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    depends_on: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    networks: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    restart: Option<&'static str>,
}

impl From<&Service> for ServiceYaml {
    fn from(service: &Service) -> Self {
        let optional = |value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        };
        let list = |values: &[String]| -> Vec<String> {
            non_blank(values).map(str::to_string).collect()
        };
        Self {
            image: service.image.trim().to_string(),
            container_name: optional(&service.container_name),
            command: optional(&service.command),
            ports: list(&service.ports),
            environment: list(&service.environment),
            volumes: list(&service.volumes),
            depends_on: list(&service.depends_on),
            networks: list(&service.networks),
            restart: (service.restart != RestartPolicy::No).then(|| service.restart.value()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::Value;

    fn project() -> ComposeProject {
        let mut project = ComposeProject::default();
        project.add_preset(Preset::Nginx);
        project.add_preset(Preset::Postgres);
        project.services[0].depends_on = vec!["db".into()];
        project.services[0].networks = vec!["front".into()];
        project
    }

    #[test]
    fn yaml_lists_images_and_named_volumes() {
        let yaml = project().to_yaml().unwrap();
        let parsed: Value = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(parsed["services"]["web"]["image"], Value::from("nginx:latest"));
        assert_eq!(parsed["services"]["db"]["image"], Value::from("postgres:16"));
        assert_eq!(parsed["services"]["web"]["restart"], Value::from("unless-stopped"));
        assert!(parsed["volumes"].get("pgdata").is_some());
        assert!(parsed["volumes"].get("./html").is_none());
        assert!(parsed["networks"].get("front").is_some());
        assert!(yaml.find("web:").unwrap() < yaml.find("db:").unwrap());
    }

    #[test]
    fn empty_fields_are_omitted() {
        let mut project = ComposeProject::default();
        project.add(Service {
            name: "solo".into(),
            image: "busybox".into(),
            ports: vec!["  ".into()],
            ..Service::default()
        });
        let yaml = project.to_yaml().unwrap();
        assert!(!yaml.contains("ports"));
        assert!(!yaml.contains("restart"));
        assert!(!yaml.contains("volumes"));
    }

    #[test]
    fn validation_reports_each_problem() {
        let mut project = ComposeProject::default();
        project.add(Service {
            name: "api".into(),
            ports: vec!["80:http".into(), "53/udp".into()],
            depends_on: vec!["ghost".into()],
            ..Service::default()
        });
        project.add(Service {
            name: "api".into(),
            image: "x".into(),
            ..Service::default()
        });
        let messages: Vec<String> = project
            .validate()
            .into_iter()
            .map(|issue| format!("{}:{}", issue.service, issue.message))
            .collect();
        assert_eq!(messages.len(), 4, "{messages:?}");
        assert!(messages[0].contains("image is required"));
        assert!(messages[1].contains("80:http"));
        assert!(messages[2].contains("ghost"));
        assert!(messages[3].starts_with("1:") && messages[3].contains("more than once"));
        assert!(matches!(project.to_yaml(), Err(ComposeError::Invalid(_))));
    }

    #[test]
    fn port_mapping_syntax() {
        for valid in ["80", "8080:80", "53/udp", "443:443/tcp"] {
            assert!(is_valid_port_mapping(valid), "{valid}");
        }
        for invalid in ["", "0", "70000", "80:", "80/sctp", "a:b", "+80:80", "80:+80", "-1"] {
            assert!(!is_valid_port_mapping(invalid), "{invalid}");
        }
    }

    #[test]
    fn presets_get_unique_names_and_removal_cleans_dependencies() {
        let mut project = project();
        let second = project.add_preset(Preset::Nginx);
        assert_eq!(project.services[second].name, "web2");

        project.remove(1).unwrap();
        assert!(project.services[0].depends_on.is_empty());
        assert!(matches!(project.remove(9), Err(ComposeError::UnknownService(9))));
    }
}
