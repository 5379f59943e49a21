use crate::models::Language;

/// Look up a user-facing string in the given language. Keys without a
/// translation fall back to English; unknown keys echo back so a missing
/// entry shows up in testing instead of panicking.
pub fn t(lang: Language, key: &str) -> &str {
    match lang {
        Language::En => english(key).unwrap_or(key),
        _ => localized(lang, key)
            .or_else(|| english(key))
            .unwrap_or(key),
    }
}

fn english(key: &str) -> Option<&'static str> {
    Some(match key {
        "welcome" => "Welcome to AnonPairChat! Your friendly anonymous chat to meet new people from around the world.",
        "choose_language" => "Choose your language: en, ar, hi, id",
        "language_set" => "Language updated.",
        "match_found" => "Match found! Say hi to your partner.",
        "searching_partner" => "Searching for a partner... Use /end to cancel.",
        "queue_waiting" => "No matches right now. You are in the priority queue and will be matched as soon as someone matching your filters comes online!",
        "already_in_room" => "You are already in a chat. Use /end or /next to leave first.",
        "already_searching" => "You are already searching for a partner... Use /end to stop.",
        "search_stopped" => "Stopped searching for a partner.",
        "not_searching" => "You are not currently searching.",
        "end_chat" => "You have left the chat.",
        "partner_left" => "Your chat partner has left the chat.",
        "not_in_room" => "You are not in a chat. Use /find to start one.",
        "chat_error" => "Chat room error. Please use /find again.",
        "profile_setup_required" => "Please complete your profile first before you can start chatting!",
        "ask_gender" => "Select your gender: male or female.",
        "ask_region" => "Select your region: Africa, Europe, Asia, North America, South America, Oceania or Antarctica.",
        "ask_country" => "Type your country name.",
        "profile_saved" => "Profile saved. Use /find to start chatting.",
        "invalid_option" => "Invalid option, please try again.",
        "blocked_word" => "Your message contains a blocked word. Please be respectful.",
        "policy_warning" => "Links and bot usernames are not allowed. This is against bot policy.",
        "policy_final" => "You have violated the bot policy multiple times. Admin has been notified.",
        "delivery_failed" => "Could not deliver your message right now. Please try again.",
        "premium_only" => "This feature is for premium users only.",
        "premium_expired" => "Your premium membership has expired. Use /upgrade to renew.",
        "filters_intro" => "Set your preferred partner filters.",
        "ask_filter_gender" => "Preferred gender: male, female or any.",
        "ask_filter_region" => "Preferred region: Africa, Europe, Asia, North America, South America, Oceania, Antarctica or any.",
        "ask_filter_language" => "Preferred language: en, ar, hi, id or any.",
        "filters_saved" => "Your filters have been saved.",
        "upgrade_tip" => "Please upload payment proof (photo, screenshot, or document).",
        "upgrade_in_room" => "You cannot upgrade while in a chat. Please end the chat first.",
        "proof_sent" => "Proof sent to admins for review.",
        "report_no_room" => "You can only report a user while you are in a chat room. Use /find to start chatting.",
        "report_sent" => "Report sent to admin. Thank you for helping keep our platform safe.",
        "referral_reward" => "Congrats! Someone joined using your referral link. You got 1 day of premium!",
        "blocked_notice" => "You are blocked from using this service.",
        "unknown_command" => "Unknown command.",
        _ => return None,
    })
}

fn localized(lang: Language, key: &str) -> Option<&'static str> {
    match lang {
        Language::En => None,
        Language::Ar => Some(match key {
            "match_found" => "تم العثور على شريك! ألقِ التحية على شريكك.",
            "searching_partner" => "جارٍ البحث عن شريك... استخدم ‎/end للإلغاء.",
            "partner_left" => "غادر شريكك المحادثة.",
            "end_chat" => "لقد غادرت المحادثة.",
            "not_in_room" => "أنت لست في محادثة. استخدم ‎/find للبدء.",
            "already_in_room" => "أنت في محادثة بالفعل. استخدم ‎/end أو ‎/next أولاً.",
            "queue_waiting" => "لا توجد نتائج الآن. أنت في قائمة الانتظار وسيتم إشعارك عند العثور على شريك مطابق!",
            "blocked_word" => "رسالتك تحتوي على كلمة محظورة. يرجى الالتزام بالاحترام.",
            "policy_warning" => "الروابط وأسماء البوتات غير مسموح بها. هذا مخالف لسياسة البوت.",
            "premium_expired" => "انتهى اشتراكك المميز. استخدم ‎/upgrade للتجديد.",
            "report_sent" => "تم إرسال البلاغ إلى الإدارة. شكراً لمساعدتك في الحفاظ على أمان المنصة.",
            "profile_setup_required" => "يرجى إكمال ملفك الشخصي أولاً قبل بدء الدردشة!",
            "search_stopped" => "تم إيقاف البحث عن شريك.",
            "referral_reward" => "تهانينا! انضم شخص عبر رابط الدعوة الخاص بك وحصلت على يوم مميز مجاني!",
            _ => return None,
        }),
        Language::Hi => Some(match key {
            "match_found" => "साथी मिल गया! अपने साथी को नमस्ते कहें।",
            "searching_partner" => "साथी खोजा जा रहा है... रद्द करने के लिए /end भेजें।",
            "partner_left" => "आपका चैट साथी चला गया है।",
            "end_chat" => "आपने चैट छोड़ दी है।",
            "not_in_room" => "आप किसी चैट में नहीं हैं। शुरू करने के लिए /find भेजें।",
            "already_in_room" => "आप पहले से ही चैट में हैं। पहले /end या /next भेजें।",
            "queue_waiting" => "अभी कोई मेल नहीं मिला। आप प्राथमिकता सूची में हैं, मेल मिलते ही सूचित किया जाएगा!",
            "blocked_word" => "आपके संदेश में प्रतिबंधित शब्द है। कृपया सम्मानजनक रहें।",
            "policy_warning" => "लिंक और बॉट उपयोगकर्ता नाम की अनुमति नहीं है। यह बॉट नीति के विरुद्ध है।",
            "premium_expired" => "आपकी प्रीमियम सदस्यता समाप्त हो गई है। नवीनीकरण के लिए /upgrade भेजें।",
            "report_sent" => "रिपोर्ट व्यवस्थापक को भेज दी गई है। मंच को सुरक्षित रखने में मदद के लिए धन्यवाद।",
            "profile_setup_required" => "चैट शुरू करने से पहले कृपया अपनी प्रोफ़ाइल पूरी करें!",
            "search_stopped" => "साथी की खोज रोक दी गई है।",
            "referral_reward" => "बधाई हो! आपके लिंक से कोई जुड़ा और आपको 1 दिन का प्रीमियम मिला!",
            _ => return None,
        }),
        Language::Id => Some(match key {
            "match_found" => "Pasangan ditemukan! Sapa pasanganmu.",
            "searching_partner" => "Mencari pasangan... Kirim /end untuk membatalkan.",
            "partner_left" => "Pasangan chatmu telah pergi.",
            "end_chat" => "Kamu telah meninggalkan obrolan.",
            "not_in_room" => "Kamu tidak sedang dalam obrolan. Kirim /find untuk memulai.",
            "already_in_room" => "Kamu sudah dalam obrolan. Kirim /end atau /next dulu.",
            "queue_waiting" => "Belum ada yang cocok. Kamu berada di antrean prioritas dan akan diberi tahu saat ada pasangan yang cocok!",
            "blocked_word" => "Pesanmu mengandung kata terlarang. Harap tetap sopan.",
            "policy_warning" => "Tautan dan username bot tidak diizinkan. Ini melanggar kebijakan bot.",
            "premium_expired" => "Keanggotaan premium kamu telah berakhir. Kirim /upgrade untuk memperpanjang.",
            "report_sent" => "Laporan telah dikirim ke admin. Terima kasih telah membantu menjaga keamanan platform.",
            "profile_setup_required" => "Silakan lengkapi profilmu dulu sebelum mulai mengobrol!",
            "search_stopped" => "Pencarian pasangan dihentikan.",
            "referral_reward" => "Selamat! Seseorang bergabung lewat tautan undanganmu dan kamu mendapat premium 1 hari!",
            _ => return None,
        }),
    }
}
