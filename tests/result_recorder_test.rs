// ==========================================
// 赛果录入器集成测试
// ==========================================
// 职责: 验证比分校验、积分映射、权限、更正策略
// ==========================================


#[cfg(test)]
mod result_recorder_test {
    use league_engine::config::{config_keys, ConfigManager};
    use league_engine::domain::{ActingIdentity, LeagueMatch};
    use league_engine::engine::{
        EngineError, FixtureMaterializer, LeagueEventPublisher, LeagueEventType, ResultRecorder,
    };
    use league_engine::repository::{LeagueStore, LeagueStoreImpl};
    use std::sync::Arc;

    use crate::test_helpers::{
        date, find_match, ids, insert_season, setup_env, FlakyStore, RecordingPublisher, TestEnv,
    };

    /// 生成 A/B/C/D 四人赛程,返回全部比赛
    async fn scheduled_env() -> (TestEnv, Vec<LeagueMatch>) {
        let env = setup_env();
        let season = insert_season(env.store.as_ref(), date(2026, 3, 1), 14).await;
        FixtureMaterializer::new(env.store.clone(), env.config.clone(), None)
            .materialize(
                &season.season_id,
                &ids(&["A", "B", "C", "D"]),
                &ActingIdentity::admin("admin"),
            )
            .await
            .unwrap();
        let matches = env.store.query_matches(&season.season_id, None).await.unwrap();
        (env, matches)
    }

    fn recorder(env: &TestEnv) -> ResultRecorder<LeagueStoreImpl, ConfigManager> {
        ResultRecorder::new(env.store.clone(), env.config.clone(), None)
    }

    #[tokio::test]
    async fn test_points_mapping_for_all_outcomes() {
        let (env, matches) = scheduled_env().await;
        let recorder = recorder(&env);
        let admin = ActingIdentity::admin("admin");

        let cases = [((2, 0), (3, 0)), ((2, 1), (2, 1)), ((1, 2), (1, 2)), ((0, 2), (0, 3))];
        for (m, ((hg, ag), (hp, ap))) in matches.iter().zip(cases) {
            let updated = recorder.record_result(&m.match_id, hg, ag, &admin).await.unwrap();
            let result = updated.result.as_ref().unwrap();
            assert!(updated.completed);
            assert_eq!((result.home_games as i32, result.away_games as i32), (hg, ag));
            assert_eq!((result.home_points, result.away_points), (hp, ap));
            assert_eq!(result.recorded_by, "admin");

            let stored = env.store.get_match(&m.match_id).await.unwrap().unwrap();
            assert_eq!(stored, updated);
        }
    }

    #[tokio::test]
    async fn test_invalid_scores_rejected_before_io() {
        let (env, matches) = scheduled_env().await;
        let store = Arc::new(FlakyStore::new(env.store.clone()));
        let recorder = ResultRecorder::new(store.clone(), env.config.clone(), None);
        let admin = ActingIdentity::admin("admin");

        for (hg, ag) in [(1, 1), (2, 2), (3, 0), (-1, 2), (0, 0), (2, -1)] {
            match recorder.record_result(&matches[0].match_id, hg, ag, &admin).await {
                Err(EngineError::InvalidResult { home_games, away_games }) => {
                    assert_eq!((home_games, away_games), (hg, ag));
                }
                other => panic!("Expected InvalidResult for {}:{}, got {:?}", hg, ag, other),
            }
        }
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_participant_may_record_outsider_may_not() {
        let (env, matches) = scheduled_env().await;
        let recorder = recorder(&env);
        let m = find_match(&matches, "A", "D");

        let denied = recorder
            .record_result(&m.match_id, 2, 0, &ActingIdentity::player("B"))
            .await;
        assert!(matches!(denied, Err(EngineError::NotAuthorized { .. })));
        let untouched = env.store.get_match(&m.match_id).await.unwrap().unwrap();
        assert!(!untouched.completed);
        assert!(untouched.result.is_none());

        let away_side = recorder
            .record_result(&m.match_id, 0, 2, &ActingIdentity::player("D"))
            .await
            .unwrap();
        assert_eq!(away_side.result.unwrap().recorded_by, "D");
    }

    #[tokio::test]
    async fn test_missing_match() {
        let (env, _) = scheduled_env().await;
        let result = recorder(&env)
            .record_result("no-such-match", 2, 0, &ActingIdentity::admin("admin"))
            .await;
        assert!(matches!(result, Err(EngineError::MatchNotFound(_))));
    }

    #[tokio::test]
    async fn test_correction_overwrites_by_default() {
        let (env, matches) = scheduled_env().await;
        let recorder = recorder(&env);
        let admin = ActingIdentity::admin("admin");
        let match_id = &matches[0].match_id;

        recorder.record_result(match_id, 2, 0, &admin).await.unwrap();
        let corrected = recorder.record_result(match_id, 1, 2, &admin).await.unwrap();

        let result = corrected.result.unwrap();
        assert_eq!((result.home_points, result.away_points), (1, 2));
        let stored = env.store.get_match(match_id).await.unwrap().unwrap();
        assert_eq!(stored.result.unwrap().score_label(), "1:2");
    }

    #[tokio::test]
    async fn test_correction_disabled_by_config() {
        let (env, matches) = scheduled_env().await;
        env.config
            .set_global_config_value(config_keys::ALLOW_RESULT_CORRECTION, "false")
            .unwrap();
        let recorder = recorder(&env);
        let admin = ActingIdentity::admin("admin");
        let match_id = &matches[0].match_id;

        recorder.record_result(match_id, 2, 1, &admin).await.unwrap();
        match recorder.record_result(match_id, 0, 2, &admin).await {
            Err(EngineError::ResultAlreadyRecorded { existing, .. }) => assert_eq!(existing, "2:1"),
            other => panic!("Expected ResultAlreadyRecorded, got {:?}", other),
        }

        let stored = env.store.get_match(match_id).await.unwrap().unwrap();
        assert_eq!(stored.result.unwrap().score_label(), "2:1");
    }

    #[tokio::test]
    async fn test_result_event_published() {
        let (env, matches) = scheduled_env().await;
        let publisher = Arc::new(RecordingPublisher::default());
        let recorder = ResultRecorder::new(
            env.store.clone(),
            env.config.clone(),
            Some(publisher.clone() as Arc<dyn LeagueEventPublisher>),
        );

        recorder
            .record_result(&matches[2].match_id, 2, 1, &ActingIdentity::admin("admin"))
            .await
            .unwrap();

        let events = publisher.taken();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, LeagueEventType::MatchResultRecorded);
        assert_eq!(events[0].match_id.as_deref(), Some(matches[2].match_id.as_str()));
        assert_eq!(events[0].season_id, matches[2].season_id);
    }
}
