//! Bundled architecture diagrams for the MediaCMS deployment.
//!
//! Each [`Blueprint`] builds one diagram through a [`Session`] and renders it
//! on close. The infrastructure map shows the AWS topology; the three flow
//! diagrams trace numbered request/response steps between its services.

use trellis::{
    DiagramScope, DiagramSettings, EdgeAttrs, NodeHandle, Rendered, Session, TrellisError,
    style::{Direction, LineStyle},
};

const BLANK: &str = "generic.blank.Blank";
const ELB: &str = "aws.network.ELB";
const FARGATE: &str = "aws.compute.Fargate";
const RDS: &str = "aws.database.RDS";
const ELASTICACHE: &str = "aws.database.ElastiCache";
const S3: &str = "aws.storage.S3";
const SNS: &str = "aws.integration.SNS";
const CLOUDWATCH: &str = "aws.management.Cloudwatch";

type Build = fn(&mut Session) -> Result<Rendered, TrellisError>;

/// A named diagram the CLI can render.
pub struct Blueprint {
    name: &'static str,
    description: &'static str,
    build: Build,
}

impl Blueprint {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    /// Builds the diagram in `session` and renders it.
    ///
    /// # Errors
    ///
    /// Returns the first construction or render error; the diagram is
    /// discarded in that case.
    pub fn render(&self, session: &mut Session) -> Result<Rendered, TrellisError> {
        (self.build)(session)
    }
}

const BLUEPRINTS: &[Blueprint] = &[
    Blueprint {
        name: "infrastructure",
        description: "AWS topology: VPC, subnets, ECS Fargate, data layer, monitoring",
        build: infrastructure,
    },
    Blueprint {
        name: "registration",
        description: "User registration and email verification flow",
        build: registration,
    },
    Blueprint {
        name: "upload",
        description: "Video upload flow with auto-scaling",
        build: upload,
    },
    Blueprint {
        name: "share",
        description: "Watch and share video flow",
        build: share,
    },
];

/// All blueprints, in rendering order.
pub fn all() -> &'static [Blueprint] {
    BLUEPRINTS
}

/// Blueprint names, for argument validation.
pub fn names() -> impl Iterator<Item = &'static str> {
    BLUEPRINTS.iter().map(Blueprint::name)
}

pub fn find(name: &str) -> Option<&'static Blueprint> {
    BLUEPRINTS.iter().find(|blueprint| blueprint.name == name)
}

/// A solid, labeled request edge.
fn call(label: &str, color: &str) -> EdgeAttrs {
    EdgeAttrs::new().with_label(label).with_color(color)
}

/// A dashed, labeled response edge.
fn reply(label: &str, color: &str) -> EdgeAttrs {
    call(label, color).with_style(LineStyle::Dashed)
}

/// Creates a cluster holding exactly one node.
fn lone(
    diagram: &mut DiagramScope<'_>,
    cluster: &str,
    label: &str,
    category: &str,
) -> Result<NodeHandle, TrellisError> {
    diagram.cluster(cluster)?.node(label, category)
}

fn infrastructure(session: &mut Session) -> Result<Rendered, TrellisError> {
    let mut diagram = session.diagram(DiagramSettings::new(
        "MediaCMS Infrastructure - Mohsen Minai AWS Final Project",
        Direction::TopBottom,
        "mediacms_infrastructure",
    ))?;

    let users = diagram.node("Internet\nUsers", BLANK)?;

    let mut cloud = diagram.cluster("AWS Cloud - us-west-2")?;
    cloud.node("VPC\n10.0.0.0/16", "aws.network.VPC")?;

    let (igw, alb, nat) = {
        let mut public = cloud.cluster("Public Subnets (3 AZs)")?;
        public.node("Public Subnets\n10.0.1-3.0/24", "aws.network.PublicSubnet")?;
        (
            public.node("Internet\nGateway", "aws.network.InternetGateway")?,
            public.node("Application\nLoad Balancer\nPort 80/443", ELB)?,
            public.node("NAT Gateways\n(x3 - one per AZ)", "aws.network.NATGateway")?,
        )
    };

    let (tasks, rds, redis) = {
        let mut private = cloud.cluster("Private Subnets (3 AZs)")?;
        private.node("Private Subnets\n10.0.11-13.0/24", "aws.network.PrivateSubnet")?;

        let tasks = {
            let mut ecs = private.cluster("ECS Fargate Cluster (Auto-Scaling 2-10)")?;
            vec![
                ecs.node("ECS Task 1\n2 vCPU, 4GB RAM", FARGATE)?,
                ecs.node("ECS Task 2\n2 vCPU, 4GB RAM", FARGATE)?,
                ecs.node("Auto-Scaled\nTasks", FARGATE)?,
            ]
        };

        let mut data = private.cluster("Data Layer")?;
        let rds = data.node("PostgreSQL\nMulti-AZ\ndb.t3.medium", RDS)?;
        let redis = data.node("Redis Cache\ncache.t3.micro", ELASTICACHE)?;
        (tasks, rds, redis)
    };

    let s3 = cloud.node("S3 Media Bucket\nVersioning Enabled", S3)?;

    let (cw, sns) = {
        let mut monitoring = cloud.cluster("Monitoring & Alerting")?;
        (
            monitoring.node("CloudWatch\nLogs & Metrics", CLOUDWATCH)?,
            monitoring.node("SNS Topic\nEmail Alerts", SNS)?,
        )
    };
    cloud.close()?;

    diagram.connect(users, igw, &call("HTTPS", "darkgreen"))?;
    diagram.connect(igw, alb, &call("Route", "darkgreen"))?;
    diagram.connect(alb, &tasks, &call("Port 80", "blue"))?;

    let egress = EdgeAttrs::new().with_color("gray").with_style(LineStyle::Dashed);
    for &task in &tasks {
        diagram.connect(task, rds, &call("PostgreSQL\nPort 5432", "purple"))?;
        diagram.connect(task, redis, &call("Redis\nPort 6379", "red"))?;
        diagram.connect(task, s3, &call("Upload/Download\nMedia Files", "orange"))?;
        diagram.connect(task, nat, &egress.clone().with_label("Outbound\nInternet"))?;
    }
    diagram.connect(nat, igw, &egress)?;

    let metrics = EdgeAttrs::new().with_color("brown").with_style(LineStyle::Dotted);
    diagram.connect(tasks[0], cw, &metrics.clone().with_label("Metrics"))?;
    diagram.connect([rds, redis, alb], cw, &metrics)?;
    diagram.connect(cw, sns, &call("Trigger\nAlarms", "red"))?;

    diagram.close()
}

fn registration(session: &mut Session) -> Result<Rendered, TrellisError> {
    let mut diagram = session.diagram(DiagramSettings::new(
        "User Registration Flow - MediaCMS",
        Direction::LeftRight,
        "registration_flow",
    ))?;

    let user = lone(&mut diagram, "User Actions", "User\nBrowser", BLANK)?;
    let alb = lone(&mut diagram, "Load Balancing", "Application\nLoad Balancer", ELB)?;
    let ecs = lone(
        &mut diagram,
        "Application Layer",
        "ECS Fargate\nContainer\n(MediaCMS)",
        FARGATE,
    )?;
    let redis = lone(
        &mut diagram,
        "Caching Layer",
        "Redis\nSession Cache\n24h TTL",
        ELASTICACHE,
    )?;
    let rds = lone(
        &mut diagram,
        "Database Layer",
        "PostgreSQL\nUsers Table\nTokens Table",
        RDS,
    )?;
    let sns = lone(&mut diagram, "Notification Service", "SNS Topic\nEmail Service", SNS)?;

    // Registration
    let d = &mut diagram;
    d.connect(user, alb, &call("1. POST /register\n{username, email, password}", "blue"))?;
    d.connect(alb, ecs, &call("2. Route to\nhealthy task", "blue"))?;
    d.connect(ecs, rds, &call("3. Check if\nemail exists", "purple"))?;
    d.connect(rds, ecs, &reply("4. No matching\nuser found", "purple"))?;
    d.connect(ecs, rds, &call("5. Hash password\n& INSERT user", "purple"))?;
    d.connect(rds, ecs, &reply("6. User created\nID: 12345", "purple"))?;
    d.connect(ecs, rds, &call("7. Generate\nverification token", "purple"))?;
    d.connect(rds, ecs, &reply("8. Token saved\nExpires: 24h", "purple"))?;
    d.connect(ecs, sns, &call("9. Send welcome\nemail", "orange"))?;
    d.connect(sns, user, &reply("10. Email:\n'Verify account'", "orange"))?;
    d.connect(ecs, redis, &call("11. Cache user\nsession", "red"))?;
    d.connect(redis, ecs, &reply("12. Session cached\nTTL: 24h", "red"))?;
    d.connect(ecs, alb, &reply("13. HTTP 201\nCreated", "blue"))?;
    d.connect(alb, user, &reply("14. Account\ncreated!", "blue"))?;

    // Verification
    d.connect(user, alb, &call("15. Click email\nverification link", "green"))?;
    d.connect(alb, ecs, &call("16. Route\nverification", "green"))?;
    d.connect(ecs, rds, &call("17. Validate\ntoken", "purple"))?;
    d.connect(rds, ecs, &reply("18. Token found\n& valid", "purple"))?;
    d.connect(ecs, rds, &call("19. UPDATE user\nverified=true", "purple"))?;
    d.connect(rds, ecs, &reply("20. User\nverified", "purple"))?;
    d.connect(ecs, redis, &call("21. Update\ncached user", "red"))?;
    d.connect(redis, ecs, &reply("22. Cache\nupdated", "red"))?;
    d.connect(ecs, alb, &reply("23. HTTP 200 OK\nRedirect /login", "green"))?;
    d.connect(alb, user, &reply("24. Email verified!\nLogin now", "green"))?;

    diagram.close()
}

fn upload(session: &mut Session) -> Result<Rendered, TrellisError> {
    let mut diagram = session.diagram(DiagramSettings::new(
        "Video Upload Flow with Auto-Scaling - MediaCMS",
        Direction::LeftRight,
        "upload_flow",
    ))?;

    let user = lone(&mut diagram, "User", "User\nBrowser", BLANK)?;
    let alb = lone(&mut diagram, "Load Balancing", "Application\nLoad Balancer", ELB)?;
    let ecs = lone(
        &mut diagram,
        "Application Layer",
        "ECS Fargate\nTask\n2vCPU, 4GB RAM",
        FARGATE,
    )?;
    let redis = lone(&mut diagram, "Cache", "Redis\nSession\n& Metadata", ELASTICACHE)?;
    let rds = lone(&mut diagram, "Database", "PostgreSQL\nVideo Metadata\n& Records", RDS)?;
    let s3 = lone(&mut diagram, "Storage", "S3 Bucket\nMedia Files\nVersioning", S3)?;
    let (cw, autoscale) = {
        let mut monitoring = diagram.cluster("Monitoring")?;
        (
            monitoring.node("CloudWatch\nMetrics\n& Logs", CLOUDWATCH)?,
            monitoring.node("Auto Scaling\nPolicy\n2-10 tasks", "aws.management.AutoScaling")?,
        )
    };

    // Upload
    let d = &mut diagram;
    d.connect(user, alb, &call("1. POST /upload\nvideo.mp4 (500MB)\nAuth Token", "blue"))?;
    d.connect(alb, ecs, &call("2. Route to\navailable task", "blue"))?;
    d.connect(ecs, redis, &call("3. Validate\nJWT token", "red"))?;
    d.connect(redis, ecs, &reply("4. User authenticated\nID: 12345", "red"))?;
    d.connect(ecs, rds, &call("5. Create video record\nstatus='processing'", "purple"))?;
    d.connect(rds, ecs, &reply("6. Video ID: 9876\nCreated", "purple"))?;
    d.connect(ecs, s3, &call("7. Multipart upload\nChunks 1-10", "orange"))?;
    d.connect(s3, ecs, &reply("8. Upload complete\nS3 URL returned", "orange"))?;
    d.connect(ecs, rds, &call("9. Update metadata\nstatus='ready'", "purple"))?;
    d.connect(rds, ecs, &reply("10. Record updated", "purple"))?;
    d.connect(ecs, redis, &call("11. Cache metadata\nTTL: 1 hour", "red"))?;
    d.connect(redis, ecs, &reply("12. Cached", "red"))?;
    d.connect(ecs, cw, &call("13. Log metrics\nVideoUploaded: 1\nSize: 500MB", "brown"))?;
    d.connect(cw, ecs, &reply("14. Metric\nrecorded", "brown"))?;

    // Auto-scaling
    d.connect(cw, autoscale, &call("15. CPU > 70%\nTrigger alarm", "red"))?;
    d.connect(autoscale, ecs, &call("16. Launch\nnew task", "green"))?;

    d.connect(ecs, alb, &reply("17. HTTP 201\nCreated\n{video_id: 9876}", "blue"))?;
    d.connect(alb, user, &reply("18. Upload\nsuccessful!", "blue"))?;

    diagram.close()
}

fn share(session: &mut Session) -> Result<Rendered, TrellisError> {
    let mut diagram = session.diagram(DiagramSettings::new(
        "Watch & Share Video Flow - MediaCMS",
        Direction::LeftRight,
        "share_flow",
    ))?;

    let (owner, recipient) = {
        let mut users = diagram.cluster("Users")?;
        (
            users.node("User A\nVideo Owner", BLANK)?,
            users.node("User B\nRecipient", BLANK)?,
        )
    };
    let alb = lone(&mut diagram, "Load Balancing", "Application\nLoad Balancer", ELB)?;
    let ecs = lone(&mut diagram, "Application Layer", "ECS Fargate\nTask", FARGATE)?;
    let redis = lone(&mut diagram, "Cache Layer", "Redis\nCache\n95% Hit Rate", ELASTICACHE)?;
    let rds = lone(&mut diagram, "Database Layer", "PostgreSQL\nVideos\n& Shares", RDS)?;
    let s3 = lone(&mut diagram, "Storage", "S3 Bucket\nVideo Files", S3)?;
    let sns = lone(&mut diagram, "Notifications", "SNS Topic\nEmail Service", SNS)?;

    // Watch (cache hit)
    let d = &mut diagram;
    d.connect(owner, alb, &call("1. GET /video/9876\nRequest video", "blue"))?;
    d.connect(alb, ecs, &call("2. Route", "blue"))?;
    d.connect(ecs, redis, &call("3. Check cache\nGET video:9876", "red"))?;
    d.connect(redis, ecs, &reply("4. Cache HIT! ⚡\n{metadata}\n5ms response", "red"))?;
    d.connect(ecs, s3, &call("5. Generate\npre-signed URL\nExpires: 1 hour", "orange"))?;
    d.connect(s3, ecs, &reply("6. Signed URL\nwith credentials", "orange"))?;
    d.connect(ecs, rds, &call("7. Increment\nview counter", "purple"))?;
    d.connect(rds, ecs, &reply("8. Views: 1,234", "purple"))?;
    d.connect(ecs, redis, &call("9. Update\ncache counter", "red"))?;
    d.connect(ecs, alb, &reply("10. Return video\nmetadata & URL", "blue"))?;
    d.connect(alb, owner, &reply("11. Video loads", "blue"))?;
    d.connect(owner, s3, &call("12. Stream video\n(Direct to S3)", "orange"))?;

    // Share
    d.connect(owner, alb, &call("13. POST /share\n{video: 9876,\nto: userb@email}", "green"))?;
    d.connect(alb, ecs, &call("14. Process share", "green"))?;
    d.connect(ecs, redis, &call("15. Validate\nauth token", "red"))?;
    d.connect(redis, ecs, &reply("16. User A\nauthenticated", "red"))?;
    d.connect(ecs, rds, &call("17. INSERT share\nrecord", "purple"))?;
    d.connect(rds, ecs, &reply("18. Share ID: 555\nCreated", "purple"))?;
    d.connect(ecs, rds, &call("19. Check if\nUser B exists", "purple"))?;
    d.connect(rds, ecs, &reply("20. User B found\nID: 99999", "purple"))?;
    d.connect(ecs, rds, &call("21. Create\nnotification", "purple"))?;
    d.connect(ecs, redis, &call("22. Publish\nreal-time alert", "red"))?;
    d.connect(redis, recipient, &reply("23. 🔔 Notification", "red"))?;
    d.connect(ecs, sns, &call("24. Send email\n'User A shared video'", "brown"))?;
    d.connect(sns, recipient, &reply("25. 📧 Email with\nvideo link", "brown"))?;
    d.connect(ecs, rds, &call("26. Update share\nstatus='sent'", "purple"))?;
    d.connect(ecs, alb, &reply("27. Success\nresponse", "green"))?;
    d.connect(alb, owner, &reply("28. Video shared!", "green"))?;

    // Recipient opens the link
    d.connect(recipient, alb, &call("29. Click email\nlink", "blue"))?;
    d.connect(alb, ecs, &call("30. Track open", "blue"))?;
    d.connect(ecs, rds, &call("31. Log share\nopened", "purple"))?;
    d.connect(ecs, alb, &reply("32. Return video", "blue"))?;
    d.connect(alb, recipient, &reply("33. 🎬 Watch video\n'Shared by User A'", "blue"))?;

    diagram.close()
}
