//! Request bodies accepted by the gateway endpoints.
//!
//! Every endpoint takes the same [`RequestBody`]; each one reads only the
//! fields it cares about. Wire keys and their order follow the gateway's
//! JSON schema, including the capitalised `Name` key.

use crate::sparse::sparse_struct;

sparse_struct! {
    /// Filters for `getGuilds` searches.
    pub struct SearchCriteria => SearchCriteriaWire {
        min_member_count: i32 => "minMemberCount",
        max_member_count: i32 => "maxMemberCount",
        include_invite_only: bool => "includeInviteOnly",
        min_guild_galactic_power: i64 => "minGuildGalacticPower",
        max_guild_galactic_power: i64 => "maxGuildGalacticPower",
        recent_tb_participated_in: Vec<String> => "recentTbParticipatedIn",
    }
}

sparse_struct! {
    /// Which leaderboard to read, for `getGuildLeaderboard`.
    pub struct LeaderboardId => LeaderboardIdWire {
        leaderboard_type: i32 => "leaderboardType",
        month_offset: i32 => "monthOffset",
    }
}

sparse_struct! {
    /// Client identification the gateway forwards upstream.
    pub struct ClientSpecs => ClientSpecsWire {
        platform: String => "platform",
        bundle_id: String => "bundleId",
        external_version: String => "externalVersion",
        internal_version: String => "internalVersion",
        region: String => "region",
    }
}

sparse_struct! {
    /// Endpoint arguments.
    pub struct Payload => PayloadWire {
        search_criteria: SearchCriteria => "searchCriteria",
        leaderboard_id: LeaderboardId => "leaderboardId",
        client_specs: ClientSpecs => "clientSpecs",
        /// Game data version, as reported by `metadata`.
        version: String => "version",
        include_pve_units: bool => "includePveUnits",
        device_platform: String => "devicePlatform",
        request_segment: i32 => "requestSegment",
        items: String => "items",
        id: String => "id",
        guild_id: String => "guildId",
        include_recent_guild_activity_info: bool => "includeRecentGuildActivityInfo",
        count: i32 => "count",
        filter_type: i32 => "filterType",
        name: String => "Name",
        start_index: i32 => "startIndex",
        leaderboard_type: i32 => "leaderboardType",
        event_instance_id: String => "eventInstanceId",
        group_id: String => "groupId",
        league: i32 => "league",
        division: i32 => "division",
        /// Nine digit ally code, as a string.
        ally_code: String => "allyCode",
        player_id: String => "playerId",
        player_details_only: bool => "playerDetailsOnly",
    }
}

sparse_struct! {
    /// Top-level body shared by every POST endpoint.
    pub struct RequestBody => RequestBodyWire {
        payload: Payload => "payload",
        /// Ask the gateway to replace enum numbers with names.
        enums: bool => "enums",
        unzip: bool => "unzip",
    }
}

impl RequestBody {
    /// Body for looking up one player by ally code.
    pub fn for_ally_code(ally_code: impl Into<String>) -> Self {
        Self {
            payload: Payload {
                ally_code: ally_code.into(),
                ..Payload::default()
            },
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparse::{encode, encode_json, Sparse};
    use proptest::prelude::*;
    use serde_json::{json, Value};

    fn wire_json(body: &RequestBody) -> Value {
        serde_json::from_slice(&encode_json(body).unwrap()).unwrap()
    }

    #[test]
    fn test_ally_code_body() {
        let body = RequestBody::for_ally_code("813479227");
        assert_eq!(
            encode_json(&body).unwrap(),
            br#"{"payload":{"allyCode":"813479227"}}"#
        );
    }

    #[test]
    fn test_empty_body_is_empty_object() {
        assert_eq!(encode_json(&RequestBody::default()).unwrap(), b"{}");
    }

    #[test]
    fn test_top_level_flags_without_payload() {
        let body = RequestBody {
            enums: true,
            ..RequestBody::default()
        };
        assert_eq!(wire_json(&body), json!({"enums": true}));
    }

    #[test]
    fn test_name_key_is_capitalised() {
        let body = RequestBody {
            payload: Payload {
                name: "Guild Name".into(),
                ..Payload::default()
            },
            ..RequestBody::default()
        };
        assert_eq!(wire_json(&body), json!({"payload": {"Name": "Guild Name"}}));
    }

    #[test]
    fn test_search_criteria_presence_uses_every_field() {
        let body = RequestBody {
            payload: Payload {
                search_criteria: SearchCriteria {
                    min_guild_galactic_power: 150_000_000,
                    ..SearchCriteria::default()
                },
                ..Payload::default()
            },
            ..RequestBody::default()
        };
        assert_eq!(
            wire_json(&body),
            json!({"payload": {"searchCriteria": {"minGuildGalacticPower": 150000000}}})
        );
    }

    #[test]
    fn test_nested_groups_and_field_order() {
        let body = RequestBody {
            payload: Payload {
                leaderboard_id: LeaderboardId {
                    leaderboard_type: 4,
                    month_offset: 0,
                },
                count: 10,
                ..Payload::default()
            },
            enums: true,
            unzip: false,
        };
        assert_eq!(
            String::from_utf8(encode_json(&body).unwrap()).unwrap(),
            r#"{"payload":{"leaderboardId":{"leaderboardType":4},"count":10},"enums":true}"#
        );
    }

    fn client_specs() -> impl Strategy<Value = ClientSpecs> {
        (
            "[a-z]{0,2}",
            "[a-z]{0,2}",
            "[0-9]{0,2}",
            "[0-9]{0,2}",
            "[A-Z]{0,2}",
        )
            .prop_map(|(platform, bundle_id, external_version, internal_version, region)| {
                ClientSpecs {
                    platform,
                    bundle_id,
                    external_version,
                    internal_version,
                    region,
                }
            })
    }

    fn search_criteria() -> impl Strategy<Value = SearchCriteria> {
        (
            prop_oneof![Just(0), 1..50i32],
            prop_oneof![Just(0), 1..50i32],
            any::<bool>(),
            prop_oneof![Just(0), 1..1_000_000_000i64],
            prop_oneof![Just(0), 1..1_000_000_000i64],
            prop::collection::vec("[a-z]{1,4}", 0..3),
        )
            .prop_map(|(min, max, invite, min_gp, max_gp, recent)| SearchCriteria {
                min_member_count: min,
                max_member_count: max,
                include_invite_only: invite,
                min_guild_galactic_power: min_gp,
                max_guild_galactic_power: max_gp,
                recent_tb_participated_in: recent,
            })
    }

    fn request_body() -> impl Strategy<Value = RequestBody> {
        (
            client_specs(),
            search_criteria(),
            prop_oneof![Just(String::new()), "[0-9]{9}"],
            prop_oneof![Just(0), 1..100i32],
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(|(client_specs, search_criteria, ally_code, count, enums, unzip)| {
                RequestBody {
                    payload: Payload {
                        client_specs,
                        search_criteria,
                        ally_code,
                        count,
                        ..Payload::default()
                    },
                    enums,
                    unzip,
                }
            })
    }

    proptest! {
        #[test]
        fn prop_leaf_present_iff_non_zero(specs in client_specs()) {
            let wire = specs.to_wire();
            let all_zero = specs == ClientSpecs::default();
            prop_assert_eq!(wire.is_none(), all_zero);

            if let Some(wire) = wire {
                prop_assert_eq!(wire.platform.is_some(), !specs.platform.is_empty());
                prop_assert_eq!(wire.bundle_id.is_some(), !specs.bundle_id.is_empty());
                prop_assert_eq!(wire.region.is_some(), !specs.region.is_empty());
            }
        }

        #[test]
        fn prop_group_absent_iff_children_absent(criteria in search_criteria()) {
            let body = RequestBody {
                payload: Payload { search_criteria: criteria.clone(), ..Payload::default() },
                ..RequestBody::default()
            };
            let wire = encode(&body);
            let group = wire.payload.and_then(|p| p.search_criteria);
            prop_assert_eq!(group.is_none(), criteria == SearchCriteria::default());
        }

        #[test]
        fn prop_reencoding_is_stable(body in request_body()) {
            let first = encode_json(&body).unwrap();
            let decoded: RequestBody = serde_json::from_slice(&first).unwrap();
            let second = encode_json(&decoded).unwrap();

            prop_assert_eq!(&first, &second);
            prop_assert_eq!(decoded, body);
        }
    }
}
