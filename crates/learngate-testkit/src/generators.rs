//! Proptest generators for property-based testing.

use std::collections::BTreeSet;

use proptest::prelude::*;

use learngate_core::{Decision, DenyReason, GrantReason, GroupId, PermissionQuery, Role};

use crate::fakes::FakeDirectory;

/// User the generated scenarios are about.
pub const SUBJECT: &str = "subject";

/// Channel the generated scenarios are about.
pub const CHANNEL: u64 = 100;

/// Generate a group id from a small alphabet, so sets overlap often.
pub fn group_id() -> impl Strategy<Value = GroupId> {
    "g[0-9]{1,2}".prop_map(GroupId::from)
}

/// Generate a set of group ids.
pub fn group_set(max_len: usize) -> impl Strategy<Value = BTreeSet<GroupId>> {
    prop::collection::btree_set(group_id(), 0..=max_len)
}

/// Generate a role.
pub fn role() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::Admin), Just(Role::Learner)]
}

/// Generate a plan id, 0 standing for "no plan".
pub fn plan() -> impl Strategy<Value = u64> {
    prop_oneof![Just(0u64), 1u64..=1000u64]
}

/// Parameters for a share-check scenario.
#[derive(Debug, Clone)]
pub struct ShareParams {
    pub role: Role,
    pub is_creator: bool,
    pub user_groups: BTreeSet<GroupId>,
    /// Groups the user holds under the other role; must never count.
    pub other_role_groups: BTreeSet<GroupId>,
    pub channel_groups: BTreeSet<GroupId>,
    pub plan: u64,
    pub plan_shared: bool,
}

impl Arbitrary for ShareParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            role(),
            prop::bool::weighted(0.2), // creator
            group_set(8),
            group_set(8),
            group_set(8),
            plan(),
            any::<bool>(), // plan shared
        )
            .prop_map(
                |(role, is_creator, user_groups, other_role_groups, channel_groups, plan, plan_shared)| {
                    ShareParams {
                        role,
                        is_creator,
                        user_groups,
                        other_role_groups,
                        channel_groups,
                        plan,
                        plan_shared,
                    }
                },
            )
            .boxed()
    }
}

impl ShareParams {
    /// The query the scenario checks.
    pub fn query(&self) -> PermissionQuery {
        PermissionQuery::new(SUBJECT, CHANNEL, self.plan)
    }

    /// A directory holding exactly this scenario.
    pub fn directory(&self) -> FakeDirectory {
        let own: Vec<&str> = self.user_groups.iter().map(GroupId::as_str).collect();
        let other: Vec<&str> = self.other_role_groups.iter().map(GroupId::as_str).collect();
        let shared: Vec<&str> = self.channel_groups.iter().map(GroupId::as_str).collect();

        let mut directory = match self.role {
            Role::Admin => FakeDirectory::new()
                .with_admin(SUBJECT, &own)
                .with_learner(SUBJECT, &other),
            Role::Learner => FakeDirectory::new()
                .with_learner(SUBJECT, &own)
                .with_admin(SUBJECT, &other),
        }
        .with_channel_share(CHANNEL, &shared);

        if self.is_creator {
            directory = directory.with_creator(SUBJECT, CHANNEL);
        }
        if self.plan != 0 && self.plan_shared {
            directory = directory.with_plan_share(self.plan, SUBJECT);
        }
        directory
    }
}

/// The decision a correct engine reaches for `params`.
pub fn expected_decision(params: &ShareParams) -> Decision {
    if params.is_creator {
        return Decision::Granted(GrantReason::ChannelCreator);
    }
    if params.user_groups.is_disjoint(&params.channel_groups) {
        return Decision::Denied(DenyReason::NoSharedGroup);
    }
    match (params.plan, params.plan_shared) {
        (0, _) => Decision::Granted(GrantReason::SharedGroup),
        (_, true) => Decision::Granted(GrantReason::SharedGroupAndPlan),
        (_, false) => Decision::Denied(DenyReason::PlanNotShared),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::CallKind;
    use crate::fixtures::TestFixture;

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
    }

    proptest! {
        #[test]
        fn test_engine_matches_oracle(params: ShareParams) {
            let fixture = TestFixture::with_directory(params.directory());
            let expected = expected_decision(&params);

            for engine in fixture.engines() {
                let decision = runtime()
                    .block_on(engine.check_share(params.role, &params.query()))
                    .unwrap();
                prop_assert_eq!(decision, expected);
            }
            prop_assert_eq!(fixture.leftover_keys(), 0);
        }

        #[test]
        fn test_plan_lookup_only_after_overlap(params: ShareParams) {
            let fixture = TestFixture::with_directory(params.directory());
            let engine = fixture.local_engine();

            runtime()
                .block_on(engine.check_share(params.role, &params.query()))
                .unwrap();

            let overlap = !params.user_groups.is_disjoint(&params.channel_groups);
            let plan_asked = fixture.directory.count(CallKind::IsUserSharedWithPlan) == 1;
            prop_assert_eq!(plan_asked, !params.is_creator && overlap && params.plan != 0);
        }
    }
}
