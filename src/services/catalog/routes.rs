use crate::types::StoryRoute;

/// The five pre-authored storylines. One is picked per session.
pub fn builtin_routes() -> Vec<StoryRoute> {
    vec![
        StoryRoute::new(
            "financial_crisis",
            &[
                (5, "swiss_bank_credit_fears_1"),
                (15, "swiss_bank_credit_fears_3_collapse"),
                (20, "large_loan_default"),
                (30, "us_recession_official"),
                (40, "yen_flash_crash_up"),
                (50, "boj_easing_strengthened_qe"),
                (70, "geopolitical_risk_surges_gold"),
                (90, "tariff_hike_us_president"),
                (120, "new_cabinet_fiscal_stimulus"),
                (150, "swiss_bank_credit_fears_2_resolved"),
            ],
        ),
        StoryRoute::new(
            "pandemic",
            &[
                (3, "pandemic_occurs"),
                (15, "airline_staff_shortage"),
                (30, "antarctica_virus_detected"),
                (45, "nitori_same_store_sales_up"),
                (60, "boj_easing_strengthened_qe"),
                (80, "pharma_phase3_success"),
                (100, "new_drug_approval_venture"),
                (120, "airline_slots_expanded"),
                (140, "inbound_tourism_boom"),
                (160, "us_cpi_surprise_high"),
            ],
        ),
        StoryRoute::new(
            "fx_intervention",
            &[
                (10, "historic_yen_weakness"),
                (12, "mof_verbal_intervention_1"),
                (15, "mof_verbal_intervention_3"),
                (20, "mof_yen_intervention"),
                (40, "us_jobs_report_strong"),
                (45, "us_cpi_surprise_high"),
                (60, "rating_usdjpy_up"),
                (70, "mof_verbal_intervention_5"),
                (75, "mof_yen_intervention"),
                (90, "boj_rate_hike_17years"),
            ],
        ),
        StoryRoute::new(
            "semiconductor_cycle",
            &[
                (5, "ai_boom"),
                (15, "generative_ai_demand_semi"),
                (30, "us_president_ai_semi_deregulation"),
                (45, "semi_subsidy_package"),
                (60, "china_export_restrictions_semi"),
                (80, "semi_inventory_worsens"),
                (100, "semi_factory_utilization_low"),
                (120, "rating_semi_up"),
                (140, "china_stimulus_package"),
                (160, "ai_boom"),
            ],
        ),
        StoryRoute::new(
            "politics_and_energy",
            &[
                (3, "lower_house_dissolution_election"),
                (20, "new_cabinet_fiscal_stimulus"),
                (35, "income_tax_cut_consideration"),
                (50, "defense_budget_increase"),
                (65, "middle_east_tension"),
                (75, "opec_plus_cuts_extended"),
                (85, "middle_east_conflict_oil_spike"),
                (100, "consumption_tax_hike_announced"),
                (120, "nuclear_plant_restart"),
                (140, "rating_nikkei_up"),
            ],
        ),
    ]
}
