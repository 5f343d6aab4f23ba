// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

diesel::table! {
    historical_performances (history_id) {
        history_id -> BigInt,
        vendor_id -> BigInt,
        recorded_at -> Text,
        on_time_delivery_rate -> Double,
        quality_rating_avg -> Double,
        average_response_time -> Double,
        fulfillment_rate -> Double,
    }
}

diesel::table! {
    purchase_orders (purchase_order_id) {
        purchase_order_id -> BigInt,
        po_number -> Text,
        vendor_id -> BigInt,
        order_date -> Text,
        delivery_date -> Text,
        items -> Text,
        quantity -> Integer,
        status -> Text,
        quality_rating -> Nullable<Double>,
        issue_date -> Text,
        acknowledgment_date -> Nullable<Text>,
    }
}

diesel::table! {
    sessions (session_id) {
        session_id -> BigInt,
        access_token -> Text,
        refresh_token -> Text,
        user_id -> BigInt,
        created_at -> Text,
        expires_at -> Text,
    }
}

diesel::table! {
    users (user_id) {
        user_id -> BigInt,
        username -> Text,
        password_hash -> Text,
        role -> Text,
        is_active -> Integer,
        created_at -> Text,
        last_login_at -> Nullable<Text>,
    }
}

diesel::table! {
    vendors (vendor_id) {
        vendor_id -> BigInt,
        name -> Text,
        contact_details -> Text,
        address -> Text,
        vendor_code -> Text,
        on_time_delivery_rate -> Double,
        quality_rating_avg -> Double,
        average_response_time -> Double,
        fulfillment_rate -> Double,
    }
}

diesel::joinable!(historical_performances -> vendors (vendor_id));
diesel::joinable!(purchase_orders -> vendors (vendor_id));
diesel::joinable!(sessions -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    historical_performances,
    purchase_orders,
    sessions,
    users,
    vendors,
);
