//! Built-in entity lists used by the classifier
//!
//! The lists are plain data. [`CatalogLists`] owns a copy of them so a
//! deployment can replace or extend any list from configuration without
//! touching the classification logic.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// System and metadata entities that are not user-facing business entities
pub const SYSTEM_ENTITIES: &[&str] = &[
    // User tracking and metadata
    "systemuser",
    "team",
    "businessunit",
    "owner",
    "principal",
    "principalobjectattributeaccess",
    // Audit and tracking
    "audit",
    "userentityinstancedata",
    "userentityuisettings",
    "userquery",
    "userqueryvisualization",
    "usersettings",
    "userfiscalcalendar",
    "userapplicationmetadata",
    "userrating",
    // Duplicate detection
    "duplicaterecord",
    "duplicaterule",
    "duplicaterulecondition",
    // System jobs and processes
    "asyncoperation",
    "processsession",
    "workflowlog",
    "processtrigger",
    "workflow",
    "workflowdependency",
    // Sync and integration
    "syncerror",
    "importfile",
    "importdata",
    "importlog",
    "importmap",
    "import",
    // Bulk operations
    "bulkdeletefailure",
    "bulkdeleteoperation",
    "bulkoperation",
    "bulkoperationlog",
    // Mailbox tracking
    "mailboxtrackingfolder",
    "mailboxtrackingcategory",
    "deleteditemreference",
    // Organization settings
    "organization",
    "organizationui",
    "organizationsetting",
    // Solutions and customization
    "solution",
    "solutioncomponent",
    "publisher",
    "dependency",
    "dependencynode",
    "invaliddependency",
    // Entity metadata
    "entity",
    "attribute",
    "attributemap",
    "entitymap",
    "relationship",
    "optionset",
    // Plugins and SDK
    "sdkmessage",
    "sdkmessagefilter",
    "sdkmessageprocessingstep",
    "sdkmessageprocessingstepimage",
    "sdkmessagerequest",
    "sdkmessagerequestfield",
    "sdkmessageresponse",
    "sdkmessageresponsefield",
    "pluginassembly",
    "plugintype",
    "plugintypestatistic",
    "plugintracelog",
    "serviceendpoint",
    // Security and privileges
    "privilege",
    "role",
    "roleprivileges",
    "systemuserroles",
    "teamroles",
    "fieldsecurityprofile",
    "principalobjectaccess",
    // Saved queries and views
    "savedquery",
    "savedqueryvisualization",
    // App metadata
    "appmodule",
    "appmodulecomponent",
    "appmoduleroles",
    "appconfig",
    "appconfiginstance",
    "appconfigmaster",
    // Web resources and ribbons
    "webresource",
    "ribboncommand",
    "ribboncontextgroup",
    "ribboncustomization",
    "ribbondiff",
    "ribbonrule",
    "ribbontabtocommandmap",
    "sitemap",
    // Diagnostics
    "tracelog",
    "trace",
    // Calendar and fiscal
    "calendar",
    "calendarrule",
    "annualfiscalcalendar",
    "fixedmonthlyfiscalcalendar",
    "monthlyfiscalcalendar",
    "quarterlyfiscalcalendar",
    "semiannualfiscalcalendar",
    "recurringappointmentmaster",
    // Currency
    "transactioncurrency",
    "transactioncurrencyexchangerate",
    "subject",
    // Templates
    "template",
    "kbarticletemplate",
    "contracttemplate",
    // Localization
    "displaystring",
    "displaystringmap",
    "languagelocale",
    "languageprovisioningstate",
    "queueitem",
    // Activity plumbing
    "activitypointer",
    "activityparty",
    "activitymimeattachment",
    "attachment",
    "fileattachment",
    "teamtemplate",
    // Connection roles
    "connectionrole",
    "connectionroleassociation",
    "connectionroleobjecttypecode",
    // Process stages and flows
    "processstage",
    "businessprocessflowinstance",
    "workflowbinary",
    // Mobile offline
    "mobileofflineprofile",
    "mobileofflineprofileitem",
    "navigationsetting",
    // Similarity rules
    "similarityrule",
    "advancedsimilarityrule",
    // Text analytics
    "textanalyticsentitymapping",
    "topicmodel",
    "topicmodelconfiguration",
    "topicmodelexecutionhistory",
    "knowledgesearchmodel",
    // Hierarchy security
    "hierarchysecurityconfiguration",
    "hierarchyrule",
    // Custom controls
    "customcontrol",
    "customcontroldefaultconfig",
    "customcontrolresource",
    "entitykey",
    "fieldpermission",
    "position",
    // Reports
    "reportcategory",
    "reportentity",
    "reportlink",
    "reportvisibility",
    "systemform",
    "systemchart",
    "attributeimageconfig",
    "entityimageconfig",
    "appnotification",
    // Archive
    "archivecleanupinfo",
    "archivecleanupoperation",
    "catalog",
    "catalogassignment",
    "channelaccessprofile",
    "channelaccessprofilerule",
    "elasticfileattachment",
    // Metadata
    "attributemetadata",
    "entitymetadata",
    "globaloptionsetmetadata",
    "optionsetmetadata",
    "relationshipmetadata",
    "package",
    "provisionlanguageforuser",
    "recordimage",
    "recyclebinconfig",
    // Retention
    "retentionconfig",
    "retentionfailuredetail",
    "retentionoperation",
    "retentionoperationdetail",
    // Search
    "searchattributesettings",
    "searchcustomanalyzer",
    "searchrelationshipsettings",
    "setting",
    "settingdefinition",
    "statusmap",
    "stringmap",
    // Subscription
    "subscriptionclients",
    "subscriptionsyncinfo",
    "subscriptionstatisticsoffline",
    "subscriptionstatisticsoutlook",
    // Time zone
    "timezonedefinition",
    "timezonelocalizedname",
    "timezonerule",
    "virtualentitymetadata",
    "webwizard",
];

/// Entities always kept by the core-and-custom policy
pub const CORE_ENTITIES: &[&str] = &[
    "account",
    "contact",
    "systemuser",
    "msdyn_project",
    "email",
    "phonecall",
    "task",
    "appointment",
    "letter",
    "fax",
];

/// Team entities that are noise on the curated path
pub const CURATED_EXCLUDED: &[&str] = &[
    "qrt_taskconfiguration",
    "qrt_taskrules",
    "qrt_taskconfigrule",
    "qrt_bidissuance",
    "qrt_submittals",
    "qrt_assetcontract",
    "qrt_bidpackage",
    "qrt_bidpackage_account",
    "qrt_bidpackage_msdyn_project",
    "qrt_departmentheadsmeetingagenda",
    "qrt_flowconfiguration",
    "task",
];

/// System entities the curated path always keeps
pub const CURATED_REQUIRED: &[&str] = &["account", "contact", "systemuser", "msdyn_project"];

/// Prefix of entities owned by the team
pub const TEAM_PREFIX: &str = "qrt_";

fn to_set(names: &[&str]) -> HashSet<String> {
    names.iter().map(|n| n.to_string()).collect()
}

/// Immutable lists driving every classification policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogLists {
    /// Denylist for the business policy
    pub system_entities: HashSet<String>,

    /// Allowlist for the core-and-custom policy
    pub core_entities: HashSet<String>,

    /// Curated path: rejected before anything else
    pub curated_excluded: HashSet<String>,

    /// Curated path: accepted when not excluded
    pub curated_required: HashSet<String>,

    /// Curated path: prefix accepted when not excluded
    pub team_prefix: String,
}

impl Default for CatalogLists {
    fn default() -> Self {
        Self {
            system_entities: to_set(SYSTEM_ENTITIES),
            core_entities: to_set(CORE_ENTITIES),
            curated_excluded: to_set(CURATED_EXCLUDED),
            curated_required: to_set(CURATED_REQUIRED),
            team_prefix: TEAM_PREFIX.to_string(),
        }
    }
}

impl CatalogLists {
    /// Lowercase every entry so lookups can assume lowercase input
    pub fn normalized(mut self) -> Self {
        let lower = |set: HashSet<String>| set.into_iter().map(|n| n.to_lowercase()).collect();
        self.system_entities = lower(self.system_entities);
        self.core_entities = lower(self.core_entities);
        self.curated_excluded = lower(self.curated_excluded);
        self.curated_required = lower(self.curated_required);
        self.team_prefix = self.team_prefix.to_lowercase();
        self
    }
}
