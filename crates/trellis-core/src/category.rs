//! Node categories and icon resolution.
//!
//! A [`Category`] is a dotted path such as `aws.compute.Fargate` naming the
//! kind of infrastructure a node stands for. Categories only select the icon
//! drawn for a node; they carry no other behavior.
//!
//! Icon lookup goes through the [`IconResolver`] trait so callers can plug in
//! their own asset catalog. [`IconRegistry`] is the default implementation: a
//! table of category paths to asset files below a configurable root, seeded
//! with a built-in taxonomy and extensible at runtime.

use std::fmt;

use indexmap::IndexMap;
use log::debug;
use thiserror::Error;

use crate::identifier::Id;

/// Error returned when a category is absent from the recognized taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category `{category}`")]
pub struct UnknownCategory {
    category: String,
}

impl UnknownCategory {
    /// Creates the error for the given category path.
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
        }
    }

    /// Returns the category path that failed to resolve.
    pub fn category(&self) -> &str {
        &self.category
    }
}

/// An interned category path.
///
/// # Examples
///
/// ```
/// use trellis_core::category::Category;
///
/// let category = Category::parse("aws.database.RDS").unwrap();
/// assert_eq!(category.to_string(), "aws.database.RDS");
/// assert_eq!(category.provider(), "aws");
///
/// assert!(Category::parse("aws..RDS").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Category(Id);

impl Category {
    /// Parses a category path.
    ///
    /// A path is one or more non-empty segments separated by `.`; segments
    /// may contain ASCII letters, digits, `_` and `-`.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownCategory`] if the path is syntactically invalid, since
    /// no taxonomy can contain it.
    pub fn parse(path: &str) -> Result<Self, UnknownCategory> {
        let valid = !path.is_empty()
            && path.split('.').all(|segment| {
                !segment.is_empty()
                    && segment
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            });
        if valid {
            Ok(Self(Id::new(path)))
        } else {
            Err(UnknownCategory::new(path))
        }
    }

    /// Returns the interned identifier of this category.
    pub fn id(self) -> Id {
        self.0
    }

    /// Returns the first path segment, e.g. `aws` for `aws.compute.EC2`.
    pub fn provider(self) -> String {
        let path = self.0.to_owned_string();
        path.split('.').next().unwrap_or_default().to_owned()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Reference to the visual asset drawn for a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IconRef(String);

impl IconRef {
    /// Creates an icon reference from an asset path.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Returns the asset path.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IconRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Maps a category to the asset drawn for it.
pub trait IconResolver {
    /// Resolves the icon for `category`.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownCategory`] if the category is not part of the
    /// resolver's taxonomy.
    fn resolve_icon(&self, category: Category) -> Result<IconRef, UnknownCategory>;
}

/// Built-in taxonomy: category path and asset path relative to the icon root.
const BUILTIN_ICONS: &[(&str, &str)] = &[
    ("aws.compute.EC2", "aws/compute/ec2.png"),
    ("aws.compute.ECS", "aws/compute/elastic-container-service.png"),
    ("aws.compute.Fargate", "aws/compute/fargate.png"),
    ("aws.compute.Lambda", "aws/compute/lambda.png"),
    ("aws.database.Dynamodb", "aws/database/dynamodb.png"),
    ("aws.database.ElastiCache", "aws/database/elasticache.png"),
    ("aws.database.RDS", "aws/database/rds.png"),
    ("aws.integration.SNS", "aws/integration/simple-notification-service-sns.png"),
    ("aws.integration.SQS", "aws/integration/simple-queue-service-sqs.png"),
    ("aws.management.AutoScaling", "aws/management/auto-scaling.png"),
    ("aws.management.Cloudwatch", "aws/management/cloudwatch.png"),
    ("aws.network.CloudFront", "aws/network/cloudfront.png"),
    ("aws.network.ELB", "aws/network/elastic-load-balancing.png"),
    ("aws.network.InternetGateway", "aws/network/internet-gateway.png"),
    ("aws.network.NATGateway", "aws/network/nat-gateway.png"),
    ("aws.network.PrivateSubnet", "aws/network/private-subnet.png"),
    ("aws.network.PublicSubnet", "aws/network/public-subnet.png"),
    ("aws.network.Route53", "aws/network/route-53.png"),
    ("aws.network.VPC", "aws/network/vpc.png"),
    ("aws.security.Cognito", "aws/security/cognito.png"),
    ("aws.security.IAM", "aws/security/identity-and-access-management-iam.png"),
    ("aws.storage.S3", "aws/storage/simple-storage-service-s3.png"),
    ("generic.blank.Blank", "generic/blank/blank.png"),
    ("generic.compute.Rack", "generic/compute/rack.png"),
    ("generic.database.SQL", "generic/database/sql.png"),
    ("generic.network.Firewall", "generic/network/firewall.png"),
    ("generic.network.Router", "generic/network/router.png"),
    ("generic.storage.Storage", "generic/storage/storage.png"),
    ("onprem.client.Client", "onprem/client/client.png"),
    ("onprem.client.User", "onprem/client/user.png"),
];

/// Short names for the generic categories.
const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("blank", "generic.blank.Blank"),
    ("compute", "generic.compute.Rack"),
    ("database", "generic.database.SQL"),
    ("network", "generic.network.Router"),
    ("storage", "generic.storage.Storage"),
];

/// Default [`IconResolver`]: a category → asset table below an icon root.
///
/// # Examples
///
/// ```
/// use trellis_core::category::{Category, IconRegistry, IconResolver};
///
/// let mut registry = IconRegistry::with_builtins("resources");
/// let fargate = Category::parse("aws.compute.Fargate").unwrap();
/// assert_eq!(
///     registry.resolve_icon(fargate).unwrap().as_str(),
///     "resources/aws/compute/fargate.png"
/// );
///
/// registry.register("acme.queue.Broker", "acme/broker.png").unwrap();
/// let broker = Category::parse("acme.queue.Broker").unwrap();
/// assert!(registry.resolve_icon(broker).is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct IconRegistry {
    root: String,
    icons: IndexMap<Id, String>,
    aliases: IndexMap<Id, Id>,
}

impl IconRegistry {
    /// Creates an empty registry whose relative asset paths live below `root`.
    pub fn new(root: impl Into<String>) -> Self {
        let root: String = root.into();
        Self {
            root: root.trim_end_matches('/').to_owned(),
            icons: IndexMap::new(),
            aliases: IndexMap::new(),
        }
    }

    /// Creates a registry holding the built-in taxonomy.
    pub fn with_builtins(root: impl Into<String>) -> Self {
        let mut registry = Self::new(root);
        for (path, asset) in BUILTIN_ICONS {
            registry.icons.insert(Id::new(path), (*asset).to_owned());
        }
        for (alias, target) in BUILTIN_ALIASES {
            registry.aliases.insert(Id::new(alias), Id::new(target));
        }
        registry
    }

    /// Returns the icon root directory.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Adds or replaces a category in the taxonomy.
    ///
    /// `asset` is taken relative to the registry root unless it is absolute.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownCategory`] if `category` is not a valid category path.
    pub fn register(
        &mut self,
        category: &str,
        asset: impl Into<String>,
    ) -> Result<(), UnknownCategory> {
        let category = Category::parse(category)?;
        let asset = asset.into();
        debug!(category = category.to_string(), asset = asset.as_str(); "Registering icon");
        self.icons.insert(category.id(), asset);
        Ok(())
    }

    /// Makes `alias` resolve to the same icon as `target`.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownCategory`] if `alias` is not a valid path or `target`
    /// is not registered.
    pub fn alias(&mut self, alias: &str, target: &str) -> Result<(), UnknownCategory> {
        let alias = Category::parse(alias)?;
        let target = Category::parse(target)?;
        if !self.icons.contains_key(&target.id()) {
            return Err(UnknownCategory::new(target.to_string()));
        }
        self.aliases.insert(alias.id(), target.id());
        Ok(())
    }

    /// Returns `true` if `category` resolves in this registry.
    pub fn contains(&self, category: Category) -> bool {
        self.asset(category).is_some()
    }

    /// Iterates over the registered (non-alias) categories in insertion order.
    pub fn categories(&self) -> impl Iterator<Item = Id> + '_ {
        self.icons.keys().copied()
    }

    fn asset(&self, category: Category) -> Option<&str> {
        let id = category.id();
        let id = self.aliases.get(&id).copied().unwrap_or(id);
        self.icons.get(&id).map(String::as_str)
    }
}

impl IconResolver for IconRegistry {
    fn resolve_icon(&self, category: Category) -> Result<IconRef, UnknownCategory> {
        let asset = self
            .asset(category)
            .ok_or_else(|| UnknownCategory::new(category.to_string()))?;

        if asset.starts_with('/') || self.root.is_empty() {
            Ok(IconRef::new(asset))
        } else {
            Ok(IconRef::new(format!("{}/{asset}", self.root)))
        }
    }
}
