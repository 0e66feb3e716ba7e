//! Declarative endpoint routing table
//!
//! Every remote endpoint is one row: operation name, HTTP method, path
//! template, and whether the call is public. The table is interpreted by a
//! single generic invocation path ([`crate::ApiClient::execute`]); there is
//! no per-endpoint wrapper code. Path templates use `{param}` placeholders
//! filled from caller-supplied pairs by [`render_path`].

use std::collections::HashMap;

use once_cell::sync::Lazy;
use reqwest::Method;

use crate::error::{ApiError, ApiResult};

/// One row of the routing table
#[derive(Debug, Clone)]
pub struct Route {
    /// Logical operation name
    pub name: &'static str,
    /// HTTP method
    pub method: Method,
    /// Path template with `{param}` placeholders
    pub path: &'static str,
    /// Public calls carry no Authorization header and skip the 401 retry
    pub public: bool,
}

const fn route(name: &'static str, method: Method, path: &'static str) -> Route {
    Route { name, method, path, public: false }
}

const fn public_route(name: &'static str, method: Method, path: &'static str) -> Route {
    Route { name, method, path, public: true }
}

/// The full endpoint surface of the remote API
pub static ROUTES: &[Route] = &[
    // Service
    public_route("status", Method::GET, "/status"),
    public_route("get_token", Method::POST, "/oauth/token"),
    route("forgot_password", Method::POST, "/users/password/forgot"),
    // Users
    route("get_all_users", Method::GET, "/users"),
    route("get_user", Method::GET, "/users/{user_id}"),
    public_route("create_user", Method::POST, "/users"),
    route("update_user", Method::PUT, "/users/{user_id}"),
    route("delete_user", Method::DELETE, "/users"),
    // Permissions
    route("get_linked_permissions", Method::GET, "/users/{user_id}/permissions"),
    route("update_linked_user_permission", Method::PUT, "/users/{user_id}/permissions"),
    route("link_user", Method::POST, "/users/permissions"),
    route("unlink_user", Method::DELETE, "/users/{user_id}"),
    // Invited users
    public_route("get_invited_user", Method::GET, "/users/invite/{invite_code}"),
    public_route("create_invited_user", Method::POST, "/users/invite/{invite_code}"),
    route("user_append", Method::POST, "/users/{user_id}/append"),
    route("user_append_remove", Method::DELETE, "/users/{user_id}/append"),
    // Companies
    route("get_all_companies", Method::GET, "/companies"),
    route("get_company", Method::GET, "/companies/{company_id}"),
    route("create_company", Method::POST, "/companies"),
    route("update_company", Method::PUT, "/companies/{company_id}"),
    route("delete_company", Method::DELETE, "/companies/{company_id}"),
    route("get_all_companies_status", Method::GET, "/companies/status"),
    route("get_company_status", Method::GET, "/companies/{company_id}/status"),
    // Locations
    route("get_all_locations", Method::GET, "/companies/{company_id}/locations"),
    route("get_location", Method::GET, "/companies/{company_id}/locations/{location_id}"),
    route("create_location", Method::POST, "/companies/{company_id}/locations"),
    route("update_location", Method::PUT, "/companies/{company_id}/locations/{location_id}"),
    route("delete_location", Method::DELETE, "/companies/{company_id}/locations/{location_id}"),
    route(
        "get_location_status",
        Method::GET,
        "/companies/{company_id}/locations/{location_id}/status",
    ),
    // Things
    route("get_thing_by_id", Method::GET, "/things/{thing_id}"),
    route("delete_thing_by_id", Method::DELETE, "/things/{thing_id}"),
    route("get_all_things", Method::GET, "/companies/{company_id}/locations/{location_id}/things"),
    route(
        "get_thing",
        Method::GET,
        "/companies/{company_id}/locations/{location_id}/things/{thing_id}",
    ),
    route(
        "create_sensor",
        Method::POST,
        "/companies/{company_id}/locations/{location_id}/things/sensors",
    ),
    route(
        "create_gateway",
        Method::POST,
        "/companies/{company_id}/locations/{location_id}/things/gateway",
    ),
    route(
        "update_thing",
        Method::PUT,
        "/companies/{company_id}/locations/{location_id}/things/{thing_id}",
    ),
    route(
        "delete_thing",
        Method::DELETE,
        "/companies/{company_id}/locations/{location_id}/things/{thing_id}",
    ),
    route(
        "get_thing_latest",
        Method::GET,
        "/companies/{company_id}/locations/{location_id}/things/latest",
    ),
    route(
        "get_sensor_history",
        Method::GET,
        "/companies/{company_id}/locations/{location_id}/things/sensors/{thing_id}/history",
    ),
    route(
        "get_thing_alert_history",
        Method::GET,
        "/companies/{company_id}/locations/{location_id}/rules/things/{thing_id}/history",
    ),
    // Rules
    route("get_all_rules", Method::GET, "/companies/{company_id}/locations/{location_id}/rules"),
    route(
        "get_all_rules_by_thing",
        Method::GET,
        "/companies/{company_id}/locations/{location_id}/rules/things/{thing_id}",
    ),
    route(
        "get_rule",
        Method::GET,
        "/companies/{company_id}/locations/{location_id}/rules/{rule_id}",
    ),
    route(
        "get_rule_history",
        Method::GET,
        "/companies/{company_id}/locations/{location_id}/rules/{rule_id}/history",
    ),
    route("create_rule", Method::POST, "/companies/{company_id}/locations/{location_id}/rules"),
    route(
        "update_rule",
        Method::PUT,
        "/companies/{company_id}/locations/{location_id}/rules/{rule_id}",
    ),
    route(
        "toggle_rule",
        Method::PUT,
        "/companies/{company_id}/locations/{location_id}/rules/{rule_id}/{state}",
    ),
    route(
        "delete_rule",
        Method::DELETE,
        "/companies/{company_id}/locations/{location_id}/rules/{rule_id}",
    ),
    // Corrective action: options
    route("get_all_options", Method::GET, "/companies/{company_id}/locations/{location_id}/options"),
    route(
        "get_option",
        Method::GET,
        "/companies/{company_id}/locations/{location_id}/options/{option_id}",
    ),
    route("create_option", Method::POST, "/companies/{company_id}/locations/{location_id}/options"),
    route(
        "update_option",
        Method::PUT,
        "/companies/{company_id}/locations/{location_id}/options/{option_id}",
    ),
    route(
        "delete_option",
        Method::DELETE,
        "/companies/{company_id}/locations/{location_id}/options/{option_id}",
    ),
    // Corrective action: notes
    route(
        "get_all_notes",
        Method::GET,
        "/companies/{company_id}/locations/{location_id}/rules/{rule_id}/notifications/{notification_id}/notes",
    ),
    route(
        "get_note",
        Method::GET,
        "/companies/{company_id}/locations/{location_id}/rules/{rule_id}/notifications/{notification_id}/notes/{note_id}",
    ),
    route(
        "create_note",
        Method::POST,
        "/companies/{company_id}/locations/{location_id}/rules/{rule_id}/notifications/{notification_id}/notes",
    ),
    route(
        "update_note",
        Method::PUT,
        "/companies/{company_id}/locations/{location_id}/rules/{rule_id}/notifications/{notification_id}/notes/{note_id}",
    ),
    route(
        "delete_note",
        Method::DELETE,
        "/companies/{company_id}/locations/{location_id}/rules/{rule_id}/notifications/{notification_id}/notes/{note_id}",
    ),
    // Corrective action: actions
    route(
        "get_all_actions",
        Method::GET,
        "/companies/{company_id}/locations/{location_id}/rules/{rule_id}/notifications/{notification_id}/actions",
    ),
    route(
        "get_action",
        Method::GET,
        "/companies/{company_id}/locations/{location_id}/rules/{rule_id}/notifications/{notification_id}/actions/{action_id}",
    ),
    route(
        "create_action",
        Method::POST,
        "/companies/{company_id}/locations/{location_id}/rules/{rule_id}/notifications/{notification_id}/actions",
    ),
    route(
        "update_action",
        Method::PUT,
        "/companies/{company_id}/locations/{location_id}/rules/{rule_id}/notifications/{notification_id}/actions/{action_id}",
    ),
    route(
        "delete_action",
        Method::DELETE,
        "/companies/{company_id}/locations/{location_id}/rules/{rule_id}/notifications/{notification_id}/actions/{action_id}",
    ),
    route(
        "get_latest_actions",
        Method::GET,
        "/companies/{company_id}/locations/{location_id}/actions",
    ),
    route(
        "get_action_count",
        Method::GET,
        "/companies/{company_id}/locations/{location_id}/rules/{rule_id}/actions/count",
    ),
    // Maps
    route("get_all_maps", Method::GET, "/companies/{company_id}/locations/{location_id}/maps"),
    route(
        "get_map",
        Method::GET,
        "/companies/{company_id}/locations/{location_id}/maps/{map_id}",
    ),
    route(
        "delete_map",
        Method::DELETE,
        "/companies/{company_id}/locations/{location_id}/maps/{map_id}",
    ),
    route(
        "create_google_map",
        Method::POST,
        "/companies/{company_id}/locations/{location_id}/maps/google",
    ),
    // Markers
    route(
        "get_all_markers",
        Method::GET,
        "/companies/{company_id}/locations/{location_id}/maps/{map_id}/markers",
    ),
    route(
        "get_marker",
        Method::GET,
        "/companies/{company_id}/locations/{location_id}/maps/{map_id}/markers/{marker_id}",
    ),
    route(
        "create_marker",
        Method::POST,
        "/companies/{company_id}/locations/{location_id}/maps/{map_id}/markers",
    ),
    route(
        "update_marker",
        Method::PUT,
        "/companies/{company_id}/locations/{location_id}/maps/{map_id}/markers/{marker_id}",
    ),
    route(
        "delete_marker",
        Method::DELETE,
        "/companies/{company_id}/locations/{location_id}/maps/{map_id}/markers/{marker_id}",
    ),
    // Reports
    route("get_all_reports", Method::GET, "/companies/{company_id}/reports"),
    route("get_report", Method::GET, "/companies/{company_id}/reports/{report_id}"),
    route("create_report", Method::POST, "/companies/{company_id}/reports"),
    route("update_report", Method::PUT, "/companies/{company_id}/reports/{report_id}"),
    route("toggle_report", Method::PUT, "/companies/{company_id}/reports/{report_id}/{state}"),
    route("delete_report", Method::DELETE, "/companies/{company_id}/reports/{report_id}"),
    route(
        "get_report_history",
        Method::GET,
        "/companies/{company_id}/reports/{report_id}/history",
    ),
    route("create_report_times", Method::POST, "/companies/{company_id}/reports/{report_id}/times"),
    route(
        "delete_report_times",
        Method::DELETE,
        "/companies/{company_id}/reports/{report_id}/times/{time_id}",
    ),
    route(
        "create_report_things",
        Method::POST,
        "/companies/{company_id}/reports/{report_id}/things",
    ),
    route(
        "delete_report_things",
        Method::DELETE,
        "/companies/{company_id}/reports/{report_id}/things/{thing_id}",
    ),
    route("generate_report", Method::POST, "/reports/{report_id}/generate"),
    // Utils
    route("get_all_thing_types", Method::GET, "/things/types"),
    route("notify", Method::POST, "/notify"),
    route("notify_invited", Method::POST, "/notify/invite/{user_id}"),
    // v1.0: integrations
    route("get_all_integrations", Method::GET, "/v1.0/integrations"),
    route("get_integration", Method::GET, "/v1.0/integrations/{integration_id}"),
    // v1.0: fuses
    route("get_all_fuses", Method::GET, "/v1.0/fuses"),
    route("get_fuse", Method::GET, "/v1.0/fuses/{fuse_id}"),
    route("create_fuse", Method::POST, "/v1.0/fuses"),
    route("update_fuse", Method::PUT, "/v1.0/fuses/{fuse_id}"),
    route("delete_fuse", Method::DELETE, "/v1.0/fuses/{fuse_id}"),
    // v1.0: uses
    route("get_all_uses", Method::GET, "/v1.0/things/uses"),
    route("get_uses", Method::GET, "/v1.0/things/uses/{use_id}"),
    route("create_uses", Method::POST, "/v1.0/things/uses"),
    route("update_uses", Method::PUT, "/v1.0/things/uses/{use_id}"),
    route("delete_uses", Method::DELETE, "/v1.0/things/uses/{use_id}"),
    // v1.0: attribute groups and attributes
    route("get_attribute_groups", Method::GET, "/v1.0/things/{thing_id}/groups"),
    route("create_group", Method::POST, "/v1.0/things/{thing_id}/groups"),
    route("update_group", Method::PUT, "/v1.0/things/{thing_id}/groups/{group_id}"),
    route("delete_group", Method::DELETE, "/v1.0/things/{thing_id}/groups/{group_id}"),
    route("create_attribute", Method::POST, "/v1.0/things/{thing_id}/groups/{group_id}/attributes"),
    route(
        "update_attribute",
        Method::PUT,
        "/v1.0/things/{thing_id}/groups/{group_id}/attributes/{attribute_id}",
    ),
    route(
        "delete_attribute",
        Method::DELETE,
        "/v1.0/things/{thing_id}/groups/{group_id}/attributes/{attribute_id}",
    ),
    // v1.0: thing types
    route("get_thing_types", Method::GET, "/v1.0/things/types"),
    route("get_thing_type", Method::GET, "/v1.0/things/types/{thing_type_id}"),
    route("create_thing_type", Method::POST, "/v1.0/things/types"),
    route("update_thing_type", Method::PUT, "/v1.0/things/types/{thing_type_id}"),
    route("delete_thing_type", Method::DELETE, "/v1.0/things/types/{thing_type_id}"),
    route(
        "get_thing_type_channels",
        Method::GET,
        "/v1.0/things/types/{thing_type_id}/channels",
    ),
    route(
        "get_thing_type_channel",
        Method::GET,
        "/v1.0/things/types/{thing_type_id}/channels/{channel_id}",
    ),
    route(
        "create_thing_type_channel",
        Method::POST,
        "/v1.0/things/types/{thing_type_id}/channels",
    ),
    route(
        "update_thing_type_channel",
        Method::PUT,
        "/v1.0/things/types/{thing_type_id}/channels/{channel_id}",
    ),
    route(
        "delete_thing_type_channel",
        Method::DELETE,
        "/v1.0/things/types/{thing_type_id}/channels/{channel_id}",
    ),
    route("get_thing_type_metas", Method::GET, "/v1.0/things/types/{thing_type_id}/meta"),
    route(
        "get_thing_type_meta",
        Method::GET,
        "/v1.0/things/types/{thing_type_id}/meta/{meta_id}",
    ),
    route("create_thing_type_meta", Method::POST, "/v1.0/things/types/{thing_type_id}/meta"),
    route(
        "update_thing_type_meta",
        Method::PUT,
        "/v1.0/things/types/{thing_type_id}/meta/{meta_id}",
    ),
    route(
        "delete_thing_type_meta",
        Method::DELETE,
        "/v1.0/things/types/{thing_type_id}/meta/{meta_id}",
    ),
    route("get_thing_type_uses", Method::GET, "/v1.0/things/types/{thing_type_id}/uses"),
    route(
        "get_thing_type_use",
        Method::GET,
        "/v1.0/things/types/{thing_type_id}/uses/{use_id}",
    ),
    route("create_thing_type_uses", Method::POST, "/v1.0/things/types/{thing_type_id}/uses"),
    route(
        "update_thing_type_uses",
        Method::PUT,
        "/v1.0/things/types/{thing_type_id}/uses/{use_id}",
    ),
    route(
        "delete_thing_type_uses",
        Method::DELETE,
        "/v1.0/things/types/{thing_type_id}/uses/{use_id}",
    ),
    // v1.0: data types
    route("get_data_types", Method::GET, "/v1.0/things/datatypes"),
    route("get_data_type", Method::GET, "/v1.0/things/datatypes/{data_type_id}"),
    route("create_data_type", Method::POST, "/v1.0/things/datatypes"),
    route("update_data_type", Method::PUT, "/v1.0/things/datatypes/{data_type_id}"),
    route("delete_data_type", Method::DELETE, "/v1.0/things/datatypes/{data_type_id}"),
    route(
        "get_data_type_properties",
        Method::GET,
        "/v1.0/things/datatypes/{data_type_id}/properties",
    ),
    route(
        "get_data_type_property",
        Method::GET,
        "/v1.0/things/datatypes/{data_type_id}/properties/{property_id}",
    ),
    route(
        "create_data_type_property",
        Method::POST,
        "/v1.0/things/datatypes/{data_type_id}/properties",
    ),
    route(
        "update_data_type_property",
        Method::PUT,
        "/v1.0/things/datatypes/{data_type_id}/properties/{property_id}",
    ),
    route(
        "delete_data_type_property",
        Method::DELETE,
        "/v1.0/things/datatypes/{data_type_id}/properties/{property_id}",
    ),
];

static ROUTE_INDEX: Lazy<HashMap<&'static str, &'static Route>> =
    Lazy::new(|| ROUTES.iter().map(|route| (route.name, route)).collect());

/// Look up a route by operation name
#[must_use]
pub fn lookup(name: &str) -> Option<&'static Route> {
    ROUTE_INDEX.get(name).copied()
}

/// Substitute `{param}` placeholders from caller-supplied pairs
///
/// # Errors
///
/// Returns a configuration error if a placeholder has no matching parameter
/// or the template is malformed.
pub fn render_path(template: &str, params: &[(&str, &str)]) -> ApiResult<String> {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        rendered.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after.find('}').ok_or_else(|| {
            ApiError::config(format!("unclosed placeholder in path template `{template}`"))
        })?;
        let name = &after[..end];
        let value = params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
            .ok_or_else(|| {
                ApiError::config(format!("missing path parameter `{name}` for `{template}`"))
            })?;
        rendered.push_str(value);
        rest = &after[end + 1..];
    }

    rendered.push_str(rest);
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    //! Unit tests for the routing table.
    use super::*;

    #[test]
    fn operation_names_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for route in ROUTES {
            assert!(seen.insert(route.name), "duplicate operation name {}", route.name);
        }
    }

    #[test]
    fn every_path_is_rooted_and_balanced() {
        for route in ROUTES {
            assert!(route.path.starts_with('/'), "{} is not rooted", route.name);
            let opens = route.path.matches('{').count();
            let closes = route.path.matches('}').count();
            assert_eq!(opens, closes, "unbalanced placeholders in {}", route.name);
        }
    }

    #[test]
    fn public_routes_match_the_remote_contract() {
        let public: Vec<&str> =
            ROUTES.iter().filter(|r| r.public).map(|r| r.name).collect();
        assert_eq!(
            public,
            vec!["status", "get_token", "create_user", "get_invited_user", "create_invited_user"]
        );
    }

    #[test]
    fn lookup_finds_routes_by_name() {
        let route = lookup("get_user").unwrap();
        assert_eq!(route.method, Method::GET);
        assert_eq!(route.path, "/users/{user_id}");
        assert!(lookup("no_such_operation").is_none());
    }

    #[test]
    fn renders_placeholders_in_order() {
        let path = render_path(
            "/companies/{company_id}/locations/{location_id}",
            &[("location_id", "l1"), ("company_id", "c1")],
        )
        .unwrap();
        assert_eq!(path, "/companies/c1/locations/l1");
    }

    #[test]
    fn renders_literal_paths_unchanged() {
        assert_eq!(render_path("/users", &[]).unwrap(), "/users");
    }

    #[test]
    fn missing_parameter_is_a_config_error() {
        let err = render_path("/users/{user_id}", &[]).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Config);
        assert!(err.message.contains("user_id"));
    }
}
