    use super::*;
    use serde_json::json;

    const EXPORT: &str = include_str!("../testdata/job_export.json");

    fn exported_job() -> JobDefinition {
        let jobs: Vec<JobDefinition> = serde_json::from_str(EXPORT).unwrap();
        jobs.into_iter().next().unwrap()
    }

    fn shell_job() -> JobDefinition {
        JobDefinition {
            name: "backup".to_string(),
            group_name: "ops/nightly".to_string(),
            project_name: "infra".to_string(),
            description: "Nightly backup".to_string(),
            log_level: "INFO".to_string(),
            dispatch: Some(JobDispatch::default()),
            command_sequence: Some(CommandSequence {
                continue_on_error: false,
                ordering_strategy: "node-first".to_string(),
                commands: vec![JobCommand {
                    shell_command: "pg_dumpall".to_string(),
                    ..Default::default()
                }],
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_export_scalars() {
        let job = exported_job();
        assert_eq!(job.id, "7a3b1c2d-0e4f-4a5b-8c6d-1e2f3a4b5c6d");
        assert_eq!(job.name, "deploy");
        assert_eq!(job.group_name, "web/release");
        assert!(job.project_name.is_empty());
        assert_eq!(job.log_level, "DEBUG");
        assert!(job.allow_concurrent_executions);
    }

    #[test]
    fn test_export_dispatch_under_nodefilters() {
        let job = exported_job();
        let dispatch = job.dispatch.unwrap();
        assert_eq!(dispatch.max_thread_count, 3);
        assert!(dispatch.continue_on_error);
        assert_eq!(dispatch.rank_attribute, "rack");
        assert_eq!(dispatch.rank_order, "descending");

        let filter = job.node_filter.unwrap();
        assert_eq!(filter.query, "tags: web");
        assert!(filter.exclude_precedence);
    }

    #[test]
    fn test_export_schedule() {
        let schedule = exported_job().schedule.unwrap();
        assert_eq!(schedule.time.seconds, "0");
        assert_eq!(schedule.time.minute, "30");
        assert_eq!(schedule.time.hour, "5");
        assert_eq!(schedule.month.day, "1");
        assert_eq!(schedule.month.month, "1");
        assert_eq!(schedule.week_day.unwrap().day, "*");
        assert_eq!(schedule.year.year, "2024");
    }

    #[test]
    fn test_export_options_list() {
        let options = exported_job().options_config.unwrap();
        assert!(options.preserve_order);
        assert_eq!(options.options.len(), 2);
        assert_eq!(options.options[0].name, "version");
        assert_eq!(options.options[0].value_choices, vec!["latest", "stable"]);
        assert!(options.options[0].require_predefined_choice);
        assert!(options.options[1].obscure_input);
        assert!(options.options[1].value_is_exposed_to_scripts);
    }

    #[test]
    fn test_export_steps() {
        let sequence = exported_job().command_sequence.unwrap();
        assert!(sequence.continue_on_error);
        assert_eq!(sequence.ordering_strategy, "step-first");

        let commands = &sequence.commands;
        assert_eq!(commands.len(), 5);
        assert_eq!(commands[0].shell_command, "git pull");
        assert_eq!(commands[1].script_file, "/opt/deploy.sh");
        assert_eq!(commands[1].script_file_args, "--fast");

        let job_ref = commands[2].job.as_ref().unwrap();
        assert_eq!(job_ref.name, "warm-cache");
        assert!(job_ref.run_for_each_node);
        assert_eq!(job_ref.arguments, "-size big");

        let step = commands[3].step_plugin.as_ref().unwrap();
        assert_eq!(step.plugin_type, "http-request");
        assert_eq!(step.config.get("retries").map(String::as_str), Some("3"));
        assert!(commands[3].node_step_plugin.is_none());

        let node_step = commands[4].node_step_plugin.as_ref().unwrap();
        assert_eq!(node_step.plugin_type, "copyfile");
        assert!(commands[4].step_plugin.is_none());
    }

    #[test]
    fn test_export_reserializes_in_export_shape() {
        let json = serde_json::to_value(exported_job()).unwrap();
        assert_eq!(json["nodefilters"]["filter"], "tags: web");
        assert_eq!(json["nodefilters"]["dispatch"]["threadcount"], 3);
        assert_eq!(json["nodefilters"]["dispatch"]["excludePrecedence"], true);
        assert!(json.get("dispatch").is_none());
        assert_eq!(json["schedule"]["month"], "1");
        assert_eq!(json["schedule"]["dayofmonth"]["day"], "1");
        assert_eq!(json["schedule"]["year"], "2024");
        assert!(json["options"].is_array());
        assert_eq!(json["sequence"]["commands"][3]["type"], "http-request");
        assert_eq!(json["sequence"]["commands"][3]["nodeStep"], false);
        assert_eq!(json["sequence"]["commands"][4]["nodeStep"], true);
        assert!(json.get("uuid").is_none());
    }

    #[test]
    fn test_serialization_uses_wire_names() {
        let json = serde_json::to_value(shell_job()).unwrap();
        assert_eq!(json["group"], "ops/nightly");
        assert_eq!(json["project"], "infra");
        assert_eq!(json["loglevel"], "INFO");
        assert_eq!(json["multipleExecutions"], false);
        assert_eq!(json["nodefilters"]["dispatch"]["threadcount"], 1);
        assert_eq!(json["nodefilters"]["dispatch"]["rankOrder"], "ascending");
        assert!(json["nodefilters"].get("filter").is_none());
        assert_eq!(json["sequence"]["strategy"], "node-first");
        assert_eq!(json["sequence"]["commands"][0]["exec"], "pg_dumpall");
    }

    #[test]
    fn test_serialization_skips_empty_id_and_absent_blocks() {
        let json = serde_json::to_value(shell_job()).unwrap();
        assert!(json.get("id").is_none());
        assert!(json.get("options").is_none());
        assert!(json.get("schedule").is_none());
        assert!(json["nodefilters"]["dispatch"].get("rankAttribute").is_none());
    }

    #[test]
    fn test_serialization_keeps_assigned_id() {
        let mut job = shell_job();
        job.id = "c0ffee".to_string();
        let json = serde_json::to_value(job).unwrap();
        assert_eq!(json["id"], "c0ffee");
    }

    #[test]
    fn test_schedule_without_weekday() {
        let json = json!({
            "name": "nightly",
            "schedule": {
                "month": "*",
                "time": {"hour": "2", "minute": "0", "seconds": "0"},
                "dayofmonth": {"day": "15"},
                "year": "*"
            }
        });
        let schedule = serde_json::from_value::<JobDefinition>(json)
            .unwrap()
            .schedule
            .unwrap();
        assert_eq!(schedule.month.day, "15");
        assert_eq!(schedule.month.month, "*");
        assert!(schedule.week_day.is_none());
        assert_eq!(schedule.year.year, "*");
    }

    #[test]
    fn test_schedule_without_day_of_month() {
        let json = json!({
            "schedule": {
                "month": "*",
                "time": {"hour": "2", "minute": "0", "seconds": "0"},
                "weekday": {"day": "MON-FRI"},
                "year": "*"
            }
        });
        let schedule = serde_json::from_value::<JobDefinition>(json)
            .unwrap()
            .schedule
            .unwrap();
        assert_eq!(schedule.month.day, "?");
        assert_eq!(schedule.week_day.unwrap().day, "MON-FRI");
    }

    #[test]
    fn test_schedule_from_crontab() {
        let json = json!({"schedule": {"crontab": "0 0/15 8-17 ? * MON-FRI"}});
        let schedule = serde_json::from_value::<JobDefinition>(json)
            .unwrap()
            .schedule
            .unwrap();
        assert_eq!(schedule.time.minute, "0/15");
        assert_eq!(schedule.month.day, "?");
        assert_eq!(schedule.week_day.unwrap().day, "MON-FRI");
        assert_eq!(schedule.year.year, "*");
    }

    #[test]
    fn test_schedule_bad_crontab() {
        let json = json!({"schedule": {"crontab": "0 0 12"}});
        let err = serde_json::from_value::<JobDefinition>(json).unwrap_err();
        assert!(err.to_string().contains("6 or 7 fields"));
    }

    #[test]
    fn test_deserialization_tolerates_missing_fields() {
        let json = json!({
            "uuid": "abc-123",
            "name": "minimal",
            "sequence": {"commands": [{"exec": "true"}]}
        });
        let job: JobDefinition = serde_json::from_value(json).unwrap();
        assert_eq!(job.id, "abc-123");
        assert!(job.group_name.is_empty());
        assert!(job.dispatch.is_none());
        assert!(job.node_filter.is_none());
        assert!(job.options_config.is_none());
        let sequence = job.command_sequence.unwrap();
        assert_eq!(sequence.commands[0].shell_command, "true");
        assert!(sequence.commands[0].job.is_none());
    }

    #[test]
    fn test_numeric_thread_count() {
        let json = json!({"nodefilters": {"dispatch": {"threadcount": 8}, "filter": "name: a"}});
        let job: JobDefinition = serde_json::from_value(json).unwrap();
        assert_eq!(job.dispatch.unwrap().max_thread_count, 8);
    }

    #[test]
    fn test_invalid_thread_count() {
        let json = json!({"nodefilters": {"dispatch": {"threadcount": "many"}}});
        let err = serde_json::from_value::<JobDefinition>(json).unwrap_err();
        assert!(err.to_string().contains("thread count"));
    }

    #[test]
    fn test_step_with_two_plugins_cannot_be_serialized() {
        let mut job = shell_job();
        job.command_sequence = Some(CommandSequence {
            commands: vec![JobCommand {
                step_plugin: Some(JobPlugin {
                    plugin_type: "slack".to_string(),
                    ..Default::default()
                }),
                node_step_plugin: Some(JobPlugin {
                    plugin_type: "copyfile".to_string(),
                    ..Default::default()
                }),
                ..Default::default()
            }],
            ..Default::default()
        });
        let err = serde_json::to_value(job).unwrap_err();
        assert!(err.to_string().contains("step 0"));
    }

    #[test]
    fn test_job_reference_wire_names() {
        let mut job = shell_job();
        job.command_sequence = Some(CommandSequence {
            commands: vec![JobCommand {
                job: Some(JobReference {
                    name: "child".to_string(),
                    group_name: "shared".to_string(),
                    run_for_each_node: true,
                    arguments: "-env prod".to_string(),
                }),
                ..Default::default()
            }],
            ..Default::default()
        });
        let json = serde_json::to_value(job).unwrap();
        let jobref = &json["sequence"]["commands"][0]["jobref"];
        assert_eq!(jobref["group"], "shared");
        assert_eq!(jobref["nodeStep"], true);
        assert_eq!(jobref["args"], "-env prod");
    }

    #[test]
    fn test_plugin_configuration_must_be_scalar() {
        let json = json!({
            "sequence": {"commands": [{"type": "x", "configuration": {"nested": {"a": 1}}}]}
        });
        let err = serde_json::from_value::<JobDefinition>(json).unwrap_err();
        assert!(err.to_string().contains("nested"));
    }
